use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::command_support::split_config_flag;

pub mod normalize;
pub mod query;
pub mod state;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let parsed = split_config_flag(&args)?;
    let Some((verb, rest)) = parsed.rest.split_first() else {
        return Ok(help_text());
    };
    let config = parsed.config.as_ref();

    match parse_cli_verb(verb) {
        CliVerb::Query => query::cmd_query(config, rest),
        CliVerb::Tools => state::cmd_tools(config, rest),
        CliVerb::Metadata => state::cmd_metadata(config),
        CliVerb::Refresh => state::cmd_refresh(config),
        CliVerb::Normalize => normalize::cmd_normalize(rest),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{verb}`")),
    }
}
