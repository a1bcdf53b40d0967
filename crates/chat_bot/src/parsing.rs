use chrono::NaiveDate;
use engine::{Amount, DateWindow, TransactionKind};

/// Format of each date in a custom report range.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// A freshly classified chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    RecordTransaction {
        kind: TransactionKind,
        amount: Amount,
        description: String,
    },
    /// Starts the report flow; arguments after `!report` are ignored.
    RequestReport,
    Help,
    Unrecognized {
        raw: String,
    },
}

/// Input understood only while a report flow is waiting for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowCommand {
    ReportChoiceToday,
    ReportChoiceCustom,
    ReportDateRange(DateWindow),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("jumlah tidak valid")]
    InvalidAmount,
    #[error("deskripsi kosong")]
    MissingDescription,
    #[error("format tanggal tidak valid")]
    InvalidDateFormat,
    #[error("tanggal awal setelah tanggal akhir")]
    InvertedDateRange,
    #[error("pilihan tidak valid")]
    InvalidChoice,
}

/// Classifies a message that arrives outside of any flow.
///
/// Rules:
/// - `!in <amount> <description...>` => income
/// - `!out <amount> <description...>` => expense
/// - `!report ...` => report flow
/// - `!help` => help
///
/// The command token is case-insensitive; the description keeps its case.
/// Anything else is `Unrecognized`.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();
    let mut tokens = trimmed.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(Command::Unrecognized {
            raw: trimmed.to_string(),
        });
    };

    match head.to_lowercase().as_str() {
        "!in" => parse_transaction(TransactionKind::Income, tokens),
        "!out" => parse_transaction(TransactionKind::Expense, tokens),
        "!report" => Ok(Command::RequestReport),
        "!help" if tokens.next().is_none() => Ok(Command::Help),
        _ => Ok(Command::Unrecognized {
            raw: trimmed.to_string(),
        }),
    }
}

fn parse_transaction<'a>(
    kind: TransactionKind,
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<Command, ParseError> {
    let amount = tokens
        .next()
        .ok_or(ParseError::InvalidAmount)
        .and_then(|token| Amount::parse_grouped(token).map_err(|_| ParseError::InvalidAmount))?;

    let description = tokens.collect::<Vec<_>>().join(" ");
    if description.is_empty() {
        return Err(ParseError::MissingDescription);
    }

    Ok(Command::RecordTransaction {
        kind,
        amount,
        description,
    })
}

/// `1` => today, `2` => custom range.
pub fn parse_report_choice(input: &str) -> Result<FlowCommand, ParseError> {
    match input.trim() {
        "1" => Ok(FlowCommand::ReportChoiceToday),
        "2" => Ok(FlowCommand::ReportChoiceCustom),
        _ => Err(ParseError::InvalidChoice),
    }
}

/// Exactly two [`DATE_FORMAT`] dates, start first.
pub fn parse_date_range(input: &str) -> Result<FlowCommand, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let [start, end] = tokens.as_slice() else {
        return Err(ParseError::InvalidDateFormat);
    };

    let parse = |token: &str| {
        NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|_| ParseError::InvalidDateFormat)
    };
    let (start, end) = (parse(start)?, parse(end)?);

    DateWindow::new(start, end)
        .map(FlowCommand::ReportDateRange)
        .ok_or(ParseError::InvertedDateRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn income_with_grouped_amount() {
        let parsed = parse_command("!in 5.000.000 gaji bulan Juni").unwrap();
        assert_eq!(
            parsed,
            Command::RecordTransaction {
                kind: TransactionKind::Income,
                amount: Amount::from_units(5_000_000),
                description: "gaji bulan Juni".to_string(),
            }
        );
    }

    #[test]
    fn expense_token_is_case_insensitive_and_spacing_collapses() {
        let parsed = parse_command("  !OUT   50,000   makan   siang ").unwrap();
        assert_eq!(
            parsed,
            Command::RecordTransaction {
                kind: TransactionKind::Expense,
                amount: Amount::from_units(50_000),
                description: "makan siang".to_string(),
            }
        );
    }

    #[test]
    fn rejects_bad_amounts() {
        for input in ["!in abc gaji", "!out -500 makan", "!in", "!out 12k kopi"] {
            assert_eq!(parse_command(input), Err(ParseError::InvalidAmount), "{input}");
        }
    }

    #[test]
    fn rejects_missing_description() {
        assert_eq!(
            parse_command("!in 5000"),
            Err(ParseError::MissingDescription)
        );
    }

    #[test]
    fn command_token_must_match_exactly() {
        assert_eq!(
            parse_command("!info 5000 x"),
            Ok(Command::Unrecognized {
                raw: "!info 5000 x".to_string()
            })
        );
    }

    #[test]
    fn report_token_must_match_exactly() {
        assert_eq!(
            parse_command("!reports"),
            Ok(Command::Unrecognized {
                raw: "!reports".to_string()
            })
        );
        assert!(matches!(
            parse_command("!reportharian 1"),
            Ok(Command::Unrecognized { .. })
        ));
    }

    #[test]
    fn report_ignores_arguments() {
        assert_eq!(parse_command("!report"), Ok(Command::RequestReport));
        assert_eq!(
            parse_command("!Report 01-06-2024 17-06-2024"),
            Ok(Command::RequestReport)
        );
    }

    #[test]
    fn help_must_stand_alone() {
        assert_eq!(parse_command(" !HELP "), Ok(Command::Help));
        assert!(matches!(
            parse_command("!help me"),
            Ok(Command::Unrecognized { .. })
        ));
    }

    #[test]
    fn plain_chatter_is_unrecognized() {
        assert_eq!(
            parse_command("halo"),
            Ok(Command::Unrecognized {
                raw: "halo".to_string()
            })
        );
        assert_eq!(
            parse_command("   "),
            Ok(Command::Unrecognized { raw: String::new() })
        );
    }

    #[test]
    fn report_choice() {
        assert_eq!(parse_report_choice(" 1 "), Ok(FlowCommand::ReportChoiceToday));
        assert_eq!(parse_report_choice("2"), Ok(FlowCommand::ReportChoiceCustom));
        assert_eq!(parse_report_choice("3"), Err(ParseError::InvalidChoice));
        assert_eq!(parse_report_choice("satu"), Err(ParseError::InvalidChoice));
    }

    #[test]
    fn date_range() {
        let parsed = parse_date_range("01-06-2024 17-06-2024").unwrap();
        assert_eq!(
            parsed,
            FlowCommand::ReportDateRange(
                DateWindow::new(date(2024, 6, 1), date(2024, 6, 17)).unwrap()
            )
        );
        assert!(matches!(
            parse_date_range("01-06-2024 01-06-2024"),
            Ok(FlowCommand::ReportDateRange(_))
        ));
    }

    #[test]
    fn date_range_rejects_malformed_input() {
        for input in [
            "",
            "01-06-2024",
            "01-06-2024 02-06-2024 03-06-2024",
            "2024-06-01 2024-06-17",
            "31-02-2024 01-03-2024",
            "kemarin hari-ini",
        ] {
            assert_eq!(
                parse_date_range(input),
                Err(ParseError::InvalidDateFormat),
                "{input}"
            );
        }
    }

    #[test]
    fn date_range_rejects_end_before_start() {
        assert_eq!(
            parse_date_range("01-06-2024 31-05-2024"),
            Err(ParseError::InvertedDateRange)
        );
    }
}
