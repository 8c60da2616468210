//! `bustrack serve`: run the REST registry in the foreground.

use crate::cli::{GlobalOpts, ServeArgs};
use crate::config::{self, Config};
use crate::error::CliError;

fn apply_serve_args(cfg: &mut Config, args: ServeArgs) {
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(store) = args.store {
        cfg.server.store_url = store;
    }
    cfg.server.fail_fast |= args.fail_fast;
}

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::resolve(global)?;
    apply_serve_args(&mut cfg, args);
    bustrack_server::serve(&cfg).await?;
    Ok(())
}
