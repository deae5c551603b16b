use crate::args::{ExportArgs, RenderArgs, SetTaxArgs};
use crate::commands::invoice::{self, ExportReceipt};
use crate::commands::Out;
use crate::export::Renderer;
use crate::{utils, Config, Result, Session};
use std::path::Path;
use tracing::{debug, info};

/// Builds one invoice from `args`, previews it and exports it with the PDF renderer.
///
/// # Errors
/// - Returns an error, and writes nothing, if any line item is rejected.
/// - Returns an error if rendering or writing the PDF fails.
pub async fn render(config: Config, args: &RenderArgs) -> Result<Out<ExportReceipt>> {
    let renderer = config.renderer();
    render_with(&config, &renderer, args).await
}

pub(crate) async fn render_with(
    config: &Config,
    renderer: &dyn Renderer,
    args: &RenderArgs,
) -> Result<Out<ExportReceipt>> {
    let mut session = Session::new(config.session_settings());
    invoice::set_client(&mut session, args.client())?;
    for item in args.items() {
        let out = invoice::add_item(config, &mut session, item)?;
        debug!("{}", out.message());
    }
    let totals = invoice::set_tax(
        config,
        &mut session,
        &SetTaxArgs {
            tax: args.tax().to_string(),
        },
    )?;
    info!("{}", totals.message());

    let today = args.date().unwrap_or_else(utils::today);
    let preview = invoice::preview(config, &mut session, today)?;
    debug!("Preview:\n{}", preview.message());

    let export = ExportArgs {
        directory: args.output().map(Path::to_path_buf),
    };
    invoice::export_invoice(config, &mut session, renderer, &export).await
}
