use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "ChillMiner commands:")]
pub enum Command {
    #[command(description = "open your account and show your balance")]
    Start,
    #[command(description = "mine $CHILL (once every 8 hours)")]
    Mine,
    #[command(description = "show your current balance")]
    Balance,
    #[command(description = "show this help")]
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_commands() {
        assert_eq!(Command::parse("/start", "chillminer_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/mine", "chillminer_bot").unwrap(), Command::Mine);
        assert_eq!(
            Command::parse("/balance@chillminer_bot", "chillminer_bot").unwrap(),
            Command::Balance
        );
        assert!(Command::parse("/withdraw", "chillminer_bot").is_err());
    }

    #[test]
    fn help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/start", "/mine", "/balance", "/help"] {
            assert!(help.contains(name), "{name} missing from help");
        }
    }
}
