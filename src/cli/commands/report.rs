use crate::cli::commands::open_pool;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::reports::ReportLogic;
use crate::errors::AppResult;
use crate::models::report_filter::ReportFilter;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    if let Commands::Report {
        kind,
        from,
        to,
        project,
        collaborator,
        profile,
        manager,
        format,
        file,
        force,
    } = cmd
    {
        let filter = ReportFilter::parse(
            from.as_deref(),
            to.as_deref(),
            *project,
            *collaborator,
            *profile,
            *manager,
        )?;

        let mut pool = open_pool(cfg)?;
        ReportLogic::run(
            &mut pool,
            cfg,
            ctx,
            *kind,
            &filter,
            *format,
            file.as_deref(),
            *force,
        )?;
    }

    Ok(())
}
