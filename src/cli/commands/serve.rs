//! Serve the HTTP API

use std::path::Path;

use vistoria::workspace::Workspace;

/// Start the API server on `port`
pub fn serve(data_dir: &Path, port: u16) -> anyhow::Result<()> {
    let ws = Workspace::open(data_dir)?;

    println!("Serving vistoria API on http://localhost:{port}");
    println!("Data directory: {}", data_dir.display());
    println!();
    println!("Press Ctrl+C to stop");

    crate::server::serve(&ws, port)
}
