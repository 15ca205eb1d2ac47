use crate::cli::commands::open_pool;
use crate::cli::parser::{BankCmd, Commands};
use crate::config::Config;
use crate::context::RequestContext;
use crate::core::banked::BankedHoursLogic;
use crate::errors::AppResult;
use crate::ui::messages::{header, success};
use crate::utils::colors::colorize_signed;
use crate::utils::decimal::parse_decimal;
use crate::utils::formatting::{fmt2_signed, opt_text};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, ctx: &RequestContext) -> AppResult<()> {
    let Commands::Bank { action } = cmd else {
        return Ok(());
    };
    let mut pool = open_pool(cfg)?;

    match action {
        BankCmd::Add { user, hours, note } => {
            let hours = parse_decimal("hours", hours)?;
            let balance =
                BankedHoursLogic::record_movement(&mut pool, cfg, ctx, *user, hours, note.as_deref())?;
            success(format!(
                "Movement of {} h recorded for user #{user}; balance {} h",
                fmt2_signed(hours),
                fmt2_signed(balance)
            ));
        }
        BankCmd::Balance { user } => {
            let balance = BankedHoursLogic::balance(&pool, *user)?;
            header(format!("Banked hours of user #{user}"));

            let movements = BankedHoursLogic::movements(&pool, *user)?;
            if !movements.is_empty() {
                let mut table = Table::new(vec!["id", "hours", "note", "created_at"]);
                for m in movements {
                    table.add_row(vec![
                        m.id.to_string(),
                        fmt2_signed(m.hours),
                        opt_text(m.note.as_deref()),
                        m.created_at,
                    ]);
                }
                print!("{}", table.render());
            }
            println!("Balance: {} h", colorize_signed(balance, &fmt2_signed(balance)));
        }
    }

    Ok(())
}
