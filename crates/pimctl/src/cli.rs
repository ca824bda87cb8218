//! Command grammar
//!
//! `pimctl <service> <action> [args...]`. Parsing never touches a store, so
//! a malformed command line fails before any permission prompt.

use crate::error::{CliError, Result};

pub const USAGE: &str = "\
Usage: pimctl <service> <action> [args...]

Services:
  calendar    Calendar events
  contacts    Address book

Run `pimctl calendar` or `pimctl contacts` to list their actions.

Options:
  -h, --help       Show this help message
  -V, --version    Show version

Environment Variables:
  PIMCTL_CALENDAR              Default calendar for events, today and search
  PIMCTL_CONFIG                Path to pimctl.toml
  PIMCTL_LOOKUP_HORIZON_YEARS  Years either side of today searched by details/delete
  PIMCTL_LOG                   Log filter (default: warn, written to stderr)";

pub const CALENDAR_USAGE: &str = "\
Usage: pimctl calendar <action> [args...]

Actions:
  calendars                                          List calendars
  events [days] [calendar]                           Events from today (default 7 days)
  today [calendar]                                   Today's events
  search <query> [days] [calendar]                   Match title or notes (default 90 days)
  create <calendar> <title> <start> <end> [notes] [location] [url]
                                                     Create an event
  details <calendar> <title>                         Show an event
  delete <calendar> <title>                          Delete an event

Dates use MM/DD/YYYY HH:MM:SS.";

pub const CONTACTS_USAGE: &str = "\
Usage: pimctl contacts <action> [args...]

Actions:
  search <query>                                           Match name or organization
  get <name>                                               Show a contact by exact name
  list                                                     List all contacts
  create <name> [email] [phone] [organization] [birthday]  Create a contact

Birthdays use YYYY-MM-DD, MM/DD/YYYY or Month D, YYYY.";

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Calendar(CalendarCommand),
    Contacts(ContactsCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarCommand {
    Calendars,
    Events {
        days: Option<u32>,
        calendar: Option<String>,
    },
    Today {
        calendar: Option<String>,
    },
    Search {
        query: String,
        days: Option<u32>,
        calendar: Option<String>,
    },
    /// Dates stay raw until dispatch so their error is a JSON document
    Create {
        calendar: String,
        title: String,
        start: String,
        end: String,
        notes: Option<String>,
        location: Option<String>,
        url: Option<String>,
    },
    Details {
        calendar: String,
        title: String,
    },
    Delete {
        calendar: String,
        title: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactsCommand {
    Search {
        query: String,
    },
    Get {
        name: String,
    },
    List,
    Create {
        name: String,
        email: Option<String>,
        phone: Option<String>,
        organization: Option<String>,
        birthday: Option<String>,
    },
}

/// Parse the arguments after the program name.
pub fn parse(args: &[String]) -> Result<Command> {
    let Some((service, rest)) = args.split_first() else {
        return Err(usage(USAGE));
    };

    match service.as_str() {
        "-h" | "--help" | "help" => Ok(Command::Help),
        "-V" | "--version" => Ok(Command::Version),
        "calendar" => parse_calendar(rest).map(Command::Calendar),
        "contacts" => parse_contacts(rest).map(Command::Contacts),
        _ => Err(usage(USAGE)),
    }
}

fn parse_calendar(args: &[String]) -> Result<CalendarCommand> {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage(CALENDAR_USAGE));
    };
    let args = Args::new(rest, CALENDAR_USAGE);

    match action.as_str() {
        "calendars" => {
            args.expect(0, 0)?;
            Ok(CalendarCommand::Calendars)
        }
        "events" => {
            args.expect(0, 2)?;
            Ok(CalendarCommand::Events {
                days: args.days(0)?,
                calendar: args.optional(1),
            })
        }
        "today" => {
            args.expect(0, 1)?;
            Ok(CalendarCommand::Today {
                calendar: args.optional(0),
            })
        }
        "search" => {
            args.expect(1, 3)?;
            Ok(CalendarCommand::Search {
                query: args.required(0),
                days: args.days(1)?,
                calendar: args.optional(2),
            })
        }
        "create" => {
            args.expect(4, 7)?;
            Ok(CalendarCommand::Create {
                calendar: args.required(0),
                title: args.required(1),
                start: args.required(2),
                end: args.required(3),
                notes: args.optional(4),
                location: args.optional(5),
                url: args.optional(6),
            })
        }
        "details" => {
            args.expect(2, 2)?;
            Ok(CalendarCommand::Details {
                calendar: args.required(0),
                title: args.required(1),
            })
        }
        "delete" => {
            args.expect(2, 2)?;
            Ok(CalendarCommand::Delete {
                calendar: args.required(0),
                title: args.required(1),
            })
        }
        _ => Err(usage(CALENDAR_USAGE)),
    }
}

fn parse_contacts(args: &[String]) -> Result<ContactsCommand> {
    let Some((action, rest)) = args.split_first() else {
        return Err(usage(CONTACTS_USAGE));
    };
    let args = Args::new(rest, CONTACTS_USAGE);

    match action.as_str() {
        "search" => {
            args.expect(1, 1)?;
            Ok(ContactsCommand::Search {
                query: args.required(0),
            })
        }
        "get" => {
            args.expect(1, 1)?;
            Ok(ContactsCommand::Get {
                name: args.required(0),
            })
        }
        "list" => {
            args.expect(0, 0)?;
            Ok(ContactsCommand::List)
        }
        "create" => {
            args.expect(1, 5)?;
            Ok(ContactsCommand::Create {
                name: args.required(0),
                email: args.optional(1),
                phone: args.optional(2),
                organization: args.optional(3),
                birthday: args.optional(4),
            })
        }
        _ => Err(usage(CONTACTS_USAGE)),
    }
}

fn usage(text: &str) -> CliError {
    CliError::Usage(text.to_string())
}

/// Positional arguments of one action
struct Args<'a> {
    values: &'a [String],
    usage: &'static str,
}

impl<'a> Args<'a> {
    fn new(values: &'a [String], usage: &'static str) -> Self {
        Self { values, usage }
    }

    /// Require between `min` and `max` arguments.
    ///
    /// Extra arguments are rejected rather than dropped, so an unquoted
    /// multi-word title is reported instead of silently truncated.
    fn expect(&self, min: usize, max: usize) -> Result<()> {
        if self.values.len() < min || self.values.len() > max {
            return Err(usage(self.usage));
        }
        Ok(())
    }

    /// Only valid after `expect` has checked the index.
    fn required(&self, index: usize) -> String {
        self.values[index].clone()
    }

    /// Absent and empty arguments are both `None`.
    fn optional(&self, index: usize) -> Option<String> {
        self.values.get(index).filter(|value| !value.is_empty()).cloned()
    }

    fn days(&self, index: usize) -> Result<Option<u32>> {
        let Some(raw) = self.optional(index) else {
            return Ok(None);
        };
        match raw.trim().parse::<u32>() {
            Ok(days) if days > 0 => Ok(Some(days)),
            _ => Err(CliError::InvalidDays(raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn is_usage(result: Result<Command>) -> bool {
        matches!(result, Err(CliError::Usage(_)))
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(&args(&["--help"])).unwrap(), Command::Help);
        assert_eq!(parse(&args(&["-h"])).unwrap(), Command::Help);
        assert_eq!(parse(&args(&["--version"])).unwrap(), Command::Version);
    }

    #[test]
    fn test_parse_unknown_service() {
        assert!(is_usage(parse(&args(&[]))));
        assert!(is_usage(parse(&args(&["reminders", "list"]))));
    }

    #[test]
    fn test_parse_unknown_action() {
        assert!(is_usage(parse(&args(&["calendar"]))));
        assert!(is_usage(parse(&args(&["calendar", "move"]))));
        assert!(is_usage(parse(&args(&["contacts", "delete", "Ada"]))));
    }

    #[test]
    fn test_parse_missing_arguments() {
        assert!(is_usage(parse(&args(&["calendar", "create", "Work", "T", "01/01/2030 09:00:00"]))));
        assert!(is_usage(parse(&args(&["calendar", "details", "Work"]))));
        assert!(is_usage(parse(&args(&["calendar", "delete"]))));
        assert!(is_usage(parse(&args(&["calendar", "search"]))));
        assert!(is_usage(parse(&args(&["contacts", "get"]))));
        assert!(is_usage(parse(&args(&["contacts", "create"]))));
    }

    #[test]
    fn test_parse_extra_arguments() {
        assert!(is_usage(parse(&args(&["calendar", "calendars", "Work"]))));
        assert!(is_usage(parse(&args(&["calendar", "details", "Work", "Team", "Sync"]))));
        assert!(is_usage(parse(&args(&["contacts", "list", "all"]))));
    }

    #[test]
    fn test_usage_text_per_service() {
        let Err(CliError::Usage(text)) = parse(&args(&["contacts"])) else {
            panic!("expected usage");
        };
        assert!(text.starts_with("Usage: pimctl contacts"));

        let Err(CliError::Usage(text)) = parse(&args(&["calendar", "details"])) else {
            panic!("expected usage");
        };
        assert!(text.starts_with("Usage: pimctl calendar"));
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            parse(&args(&["calendar", "events"])).unwrap(),
            Command::Calendar(CalendarCommand::Events {
                days: None,
                calendar: None
            })
        );
        assert_eq!(
            parse(&args(&["calendar", "events", "14", "Work"])).unwrap(),
            Command::Calendar(CalendarCommand::Events {
                days: Some(14),
                calendar: Some("Work".to_string())
            })
        );
    }

    #[test]
    fn test_parse_invalid_days() {
        for bad in ["0", "-3", "week"] {
            let err = parse(&args(&["calendar", "events", bad])).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid number of days: {bad}"));
        }
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            parse(&args(&["calendar", "search", "budget", "", "Home"])).unwrap(),
            Command::Calendar(CalendarCommand::Search {
                query: "budget".to_string(),
                days: None,
                calendar: Some("Home".to_string())
            })
        );
    }

    #[test]
    fn test_parse_create_event() {
        let command = parse(&args(&[
            "calendar",
            "create",
            "Work",
            "T",
            "01/01/2030 09:00:00",
            "01/01/2030 10:00:00",
            "",
            "Room 4",
        ]))
        .unwrap();

        assert_eq!(
            command,
            Command::Calendar(CalendarCommand::Create {
                calendar: "Work".to_string(),
                title: "T".to_string(),
                start: "01/01/2030 09:00:00".to_string(),
                end: "01/01/2030 10:00:00".to_string(),
                notes: None,
                location: Some("Room 4".to_string()),
                url: None,
            })
        );
    }

    #[test]
    fn test_parse_create_contact() {
        let command = parse(&args(&["contacts", "create", "Ada Lovelace", "", "", "Analytical Engines"])).unwrap();
        assert_eq!(
            command,
            Command::Contacts(ContactsCommand::Create {
                name: "Ada Lovelace".to_string(),
                email: None,
                phone: None,
                organization: Some("Analytical Engines".to_string()),
                birthday: None,
            })
        );
    }
}
