use crate::args::ExportArgs;
use crate::commands::dashboard::load;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Writing to this path sends the CSV to stdout.
const STDOUT: &str = "-";

/// What `export` wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    /// `None` when the CSV went to stdout.
    pub path: Option<PathBuf>,
    pub rows: usize,
}

/// Writes the displayed (filtered and sorted) expenses as CSV.
pub async fn export(config: Config, args: ExportArgs) -> Result<Out<Export>> {
    let dashboard = load(&config, args.server().server_url(), args.view()).await?;
    let rows = dashboard.displayed().len();
    let csv = dashboard.csv();

    if args.output() == Path::new(STDOUT) {
        let export = Export { path: None, rows };
        return Ok(Out::new(format!("Exported {rows} expenses"), export).with_report(csv));
    }

    let path = args.output().to_path_buf();
    utils::write(&path, csv)
        .await
        .with_context(|| format!("Unable to export expenses to {}", path.display()))
        .pub_result(ErrorType::Storage)?;
    let message = format!("Exported {rows} expenses to {}", path.display());
    Ok(Out::new(
        message,
        Export {
            path: Some(path),
            rows,
        },
    ))
}
