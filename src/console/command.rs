//! Console command grammar.

use super::ConsoleCommandError;
use crate::endpoint::domain::TransportKind;
use crate::form::{FormInputs, FormValue};

/// One parsed console command. Endpoint indices are zero-based here and
/// one-based on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show command help.
    Help,
    /// List configured endpoints.
    Servers,
    /// Append an endpoint using the default descriptor.
    Add,
    /// Remove an endpoint.
    Remove(usize),
    /// Replace an endpoint's transport and address.
    Set {
        /// Endpoint index.
        index: usize,
        /// New transport.
        transport: TransportKind,
        /// New address (URL or command line).
        address: String,
    },
    /// Print the shareable endpoint configuration.
    Share,
    /// Discover tools from every endpoint.
    Connect,
    /// List discovered tools.
    Tools,
    /// Show a tool's input form.
    Schema(String),
    /// Run a tool with `field=value` inputs.
    Run {
        /// Tool name.
        tool: String,
        /// Entered values.
        inputs: FormInputs,
    },
    /// Close the session.
    Disconnect,
    /// Leave the console.
    Quit,
}

/// Command reference printed by `help`.
pub const HELP_TEXT: &str = "\
Commands:
  help                               show this help
  servers                            list configured MCP servers
  add                                add a server using the default settings
  remove <n>                         remove server n
  set <n> <transport> <address...>   configure server n (stdio | streamable_http)
  share                              print the server configuration for sharing
  connect                            connect to all servers and load tools
  tools                              list available tools
  schema <tool>                      show a tool's input fields
  run <tool> [field=value ...]       run a tool; quote values with spaces
  disconnect                         close the session
  quit                               exit";

/// Parses one input line. Blank lines yield `None`.
///
/// # Errors
///
/// Returns [`ConsoleCommandError`] for unknown commands and malformed
/// arguments.
pub fn parse_command(line: &str) -> Result<Option<Command>, ConsoleCommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "servers" => Command::Servers,
        "add" => Command::Add,
        "remove" => Command::Remove(parse_position(words.next(), "remove")?),
        "set" => {
            let index = parse_position(words.next(), "set")?;
            let transport_text = words.next().ok_or(ConsoleCommandError::MissingArgument {
                command: "set",
                argument: "transport",
            })?;
            let transport = TransportKind::try_from(transport_text)?;
            let address = words.collect::<Vec<_>>().join(" ");
            if address.is_empty() {
                return Err(ConsoleCommandError::MissingArgument {
                    command: "set",
                    argument: "address",
                });
            }
            Command::Set {
                index,
                transport,
                address,
            }
        }
        "share" => Command::Share,
        "connect" => Command::Connect,
        "tools" => Command::Tools,
        "schema" => Command::Schema(required_word(words.next(), "schema", "tool")?),
        "run" => {
            let mut arguments = split_arguments(line)?.into_iter().skip(1);
            let tool = required_word(arguments.next().as_deref(), "run", "tool")?;
            let inputs = parse_assignments(arguments)?;
            Command::Run { tool, inputs }
        }
        "disconnect" => Command::Disconnect,
        "quit" | "exit" => Command::Quit,
        other => return Err(ConsoleCommandError::UnknownCommand(other.to_owned())),
    };
    Ok(Some(command))
}

fn required_word(
    word: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, ConsoleCommandError> {
    word.map(str::to_owned)
        .ok_or(ConsoleCommandError::MissingArgument { command, argument })
}

fn parse_position(word: Option<&str>, command: &'static str) -> Result<usize, ConsoleCommandError> {
    let text = word.ok_or(ConsoleCommandError::MissingArgument {
        command,
        argument: "n",
    })?;
    text.parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .ok_or_else(|| ConsoleCommandError::InvalidPosition(text.to_owned()))
}

/// Splits on whitespace outside double quotes and drops the quotes.
fn split_arguments(line: &str) -> Result<Vec<String>, ConsoleCommandError> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut quoted = false;

    for character in line.chars() {
        match character {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            blank if blank.is_whitespace() && !quoted => {
                if started {
                    arguments.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            other => {
                current.push(other);
                started = true;
            }
        }
    }

    if quoted {
        return Err(ConsoleCommandError::UnterminatedQuote);
    }
    if started {
        arguments.push(current);
    }
    Ok(arguments)
}

/// Reads `field=value` words. A word without `=` continues the previous
/// value after a single space.
fn parse_assignments(
    words: impl Iterator<Item = String>,
) -> Result<FormInputs, ConsoleCommandError> {
    let mut inputs = FormInputs::new();
    let mut last_field: Option<String> = None;

    for word in words {
        if let Some((field, value)) = word.split_once('=') {
            if field.is_empty() {
                return Err(ConsoleCommandError::InvalidAssignment(word.clone()));
            }
            inputs.insert(field.to_owned(), FormValue::from(value));
            last_field = Some(field.to_owned());
            continue;
        }

        match last_field.as_ref().and_then(|field| inputs.get_mut(field)) {
            Some(FormValue::Text(text)) => {
                text.push(' ');
                text.push_str(&word);
            }
            _ => return Err(ConsoleCommandError::InvalidAssignment(word)),
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::domain::ParseTransportKindError;
    use rstest::rstest;

    #[rstest]
    #[case("", None)]
    #[case("   ", None)]
    #[case("help", Some(Command::Help))]
    #[case("TOOLS", Some(Command::Tools))]
    #[case("remove 2", Some(Command::Remove(1)))]
    #[case("schema search", Some(Command::Schema("search".to_owned())))]
    #[case("exit", Some(Command::Quit))]
    fn parses_simple_commands(#[case] line: &str, #[case] expected: Option<Command>) {
        assert_eq!(parse_command(line), Ok(expected));
    }

    #[test]
    fn set_joins_the_rest_of_the_line_as_address() {
        let parsed = parse_command("set 1 stdio uvx my-server --verbose");

        assert_eq!(
            parsed,
            Ok(Some(Command::Set {
                index: 0,
                transport: TransportKind::LongLivedProcess,
                address: "uvx my-server --verbose".to_owned(),
            }))
        );
    }

    #[test]
    fn run_collects_field_assignments() {
        let parsed = parse_command("run search query=rust limit=5 note=");

        let expected: FormInputs = [
            ("query".to_owned(), FormValue::from("rust")),
            ("limit".to_owned(), FormValue::from("5")),
            ("note".to_owned(), FormValue::from("")),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            parsed,
            Ok(Some(Command::Run {
                tool: "search".to_owned(),
                inputs: expected
            }))
        );
    }

    #[rstest]
    #[case("run search query=hello world", "hello world")]
    #[case("run search query=\"hello world\"", "hello world")]
    #[case("run search query=\"a  b=c\"", "a  b=c")]
    #[case("run search \"query=x y\" z", "x y z")]
    #[case("run search query=\"\"", "")]
    fn run_values_may_contain_spaces(#[case] line: &str, #[case] expected: &str) {
        let parsed = parse_command(line);

        let inputs: FormInputs = [("query".to_owned(), FormValue::from(expected))]
            .into_iter()
            .collect();
        assert_eq!(
            parsed,
            Ok(Some(Command::Run {
                tool: "search".to_owned(),
                inputs
            }))
        );
    }

    #[rstest]
    #[case("remove 0", ConsoleCommandError::InvalidPosition("0".to_owned()))]
    #[case("remove x", ConsoleCommandError::InvalidPosition("x".to_owned()))]
    #[case("remove", ConsoleCommandError::MissingArgument { command: "remove", argument: "n" })]
    #[case("set 1 stdio", ConsoleCommandError::MissingArgument { command: "set", argument: "address" })]
    #[case("set 1 pigeon http://x", ConsoleCommandError::InvalidTransport(ParseTransportKindError("pigeon".to_owned())))]
    #[case("run search =5", ConsoleCommandError::InvalidAssignment("=5".to_owned()))]
    #[case("run search stray", ConsoleCommandError::InvalidAssignment("stray".to_owned()))]
    #[case("run search query=\"open", ConsoleCommandError::UnterminatedQuote)]
    #[case("launch", ConsoleCommandError::UnknownCommand("launch".to_owned()))]
    fn rejects_malformed_lines(#[case] line: &str, #[case] expected: ConsoleCommandError) {
        assert_eq!(parse_command(line), Err(expected));
    }
}
