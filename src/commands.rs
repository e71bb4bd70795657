// Line-delimited JSON bridge between the host shell and `App`.
// One request object per input line, one `Response` object per output line.

use serde::Deserialize;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

use crate::app::{App, Response};

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    PrintFile { filepath: String, quantity: u32 },
    Generate { filepath: String },
}

impl Command {
    pub fn dispatch(self, app: &App) -> Response {
        match self {
            Command::PrintFile { filepath, quantity } => app.print_file(&filepath, quantity),
            Command::Generate { filepath } => app.generate(&filepath),
        }
    }
}

pub fn handle_line(app: &App, line: &str) -> Response {
    match serde_json::from_str::<Command>(line) {
        Ok(command) => {
            debug!("Dispatching {:?}", command);
            command.dispatch(app)
        }
        Err(e) => {
            warn!("Rejected request {:?}: {}", line, e);
            Response::failure(format!("invalid request: {}", e))
        }
    }
}

/// Serves requests until `input` is exhausted. Blank lines are skipped.
pub fn serve<R: BufRead, W: Write>(app: &App, input: R, mut output: W) -> io::Result<()> {
    let mut handled = 0usize;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(app, &line);
        serde_json::to_writer(&mut output, &response)?;
        writeln!(output)?;
        output.flush()?;
        handled += 1;
    }

    info!("Input closed after {} requests", handled);
    Ok(())
}
