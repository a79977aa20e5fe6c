//! Interactive terminal front-end.
//!
//! Handles login, city selection, estimates, exports and the chat loop.
//! Lines starting with `/` are commands; anything else goes to the
//! assistant.

use crate::analysis;
use crate::auth::CredentialValidator;
use crate::chat::ChatService;
use crate::cli::OutputFormat;
use crate::errors::SessionError;
use crate::models::{CityDataset, PointEstimate, SummaryRow};
use crate::questions;
use crate::report;
use crate::session::{Advisor, Session};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, error, info, warn};

/// Failed logins allowed before giving up.
const MAX_LOGIN_ATTEMPTS: usize = 3;

/// Shown when the chat service could not produce a reply.
pub const RETRY_MESSAGE: &str = "⚠️  The assistant is unavailable right now, please try again.";

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Cities,
    City(String),
    Home,
    Summary,
    Options,
    Examples,
    Estimate { neighbourhood: String, room_type: String },
    Map(PathBuf),
    /// `None` writes to the configured default path.
    Export(Option<PathBuf>),
    Prompt,
    Logout,
    Quit,
    Ask(String),
    Empty,
    Invalid(String),
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Command {
    let line = line.trim();

    if line.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match (name.to_lowercase().as_str(), arg) {
        ("help" | "h" | "?", _) => Command::Help,
        ("cities", _) => Command::Cities,
        ("city", "") => Command::Invalid("usage: /city <name>".to_string()),
        ("city", city) => Command::City(city.to_string()),
        ("home", _) => Command::Home,
        ("summary", _) => Command::Summary,
        ("options", _) => Command::Options,
        ("examples", _) => Command::Examples,
        ("estimate", arg) => match arg.split_once('|') {
            Some((n, r)) if !n.trim().is_empty() && !r.trim().is_empty() => Command::Estimate {
                neighbourhood: n.trim().to_string(),
                room_type: r.trim().to_string(),
            },
            _ => Command::Invalid("usage: /estimate <neighbourhood> | <room type>".to_string()),
        },
        ("map", "") => Command::Invalid("usage: /map <file.geojson>".to_string()),
        ("map", path) => Command::Map(PathBuf::from(path)),
        ("export", "") => Command::Export(None),
        ("export", path) => Command::Export(Some(PathBuf::from(path))),
        ("prompt", _) => Command::Prompt,
        ("logout", _) => Command::Logout,
        ("quit" | "exit" | "q", _) => Command::Quit,
        (other, _) => Command::Invalid(format!("unknown command: /{} (try /help)", other)),
    }
}

const HELP_TEXT: &str = "\
Commands:
  /cities                              list available cities
  /city <name>                         select a city (clears the conversation)
  /home                                deselect the city
  /summary                             show average prices by neighbourhood & room type
  /options                             list neighbourhoods and room types
  /examples                            show example questions for the city
  /estimate <neighbourhood> | <type>   estimate nightly price and monthly revenue
  /map <file>                          write listing locations as GeoJSON
  /export [file]                       save this session (.json for JSON, Markdown otherwise)
  /prompt                              show the context sent to the assistant
  /logout                              end the session
  /quit                                exit
Anything else is sent to the advisor.";

/// How a chat loop ended.
enum Exit {
    Logout,
    Quit,
}

/// The interactive session driver.
pub struct Repl<'a> {
    advisor: &'a Advisor,
    chat: &'a dyn ChatService,
    validator: Option<&'a dyn CredentialValidator>,
    default_export: PathBuf,
}

impl<'a> Repl<'a> {
    /// `validator` is `None` when login is disabled.
    pub fn new(
        advisor: &'a Advisor,
        chat: &'a dyn ChatService,
        validator: Option<&'a dyn CredentialValidator>,
    ) -> Self {
        Self {
            advisor,
            chat,
            validator,
            default_export: PathBuf::from("stayadvisor_session.md"),
        }
    }

    /// Target of a bare `/export`.
    pub fn with_default_export(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_export = path.into();
        self
    }

    /// Run until the user quits or input ends. Returns the last session.
    pub async fn run<R>(&self, lines: &mut Lines<R>, initial_city: Option<&str>) -> Result<Session>
    where
        R: AsyncBufRead + Unpin,
    {
        print_banner();

        loop {
            let mut session = match self.login(lines).await? {
                Some(session) => session,
                None => return Ok(Session::new()),
            };

            if let Some(city) = initial_city {
                self.select_city(&mut session, city);
            } else {
                println!(
                    "Please select a city with /city <name>. Available: {}",
                    self.advisor.datasets().names().join(", ")
                );
            }

            match self.chat_loop(lines, &mut session).await? {
                Exit::Quit => return Ok(session),
                Exit::Logout if self.validator.is_none() => return Ok(session),
                Exit::Logout => {
                    info!("User logged out");
                    println!("👋 Logged out.\n");
                }
            }
        }
    }

    /// Returns `None` when input ends or too many attempts failed.
    async fn login<R>(&self, lines: &mut Lines<R>) -> Result<Option<Session>>
    where
        R: AsyncBufRead + Unpin,
    {
        let Some(validator) = self.validator else {
            return Ok(Some(Session::new()));
        };

        for attempt in 1..=MAX_LOGIN_ATTEMPTS {
            let Some(username) = prompt_line(lines, "Username: ").await? else {
                return Ok(None);
            };
            let Some(password) = prompt_line(lines, "Password: ").await? else {
                return Ok(None);
            };

            match validator.validate(username.trim(), &password) {
                Ok(user) => {
                    println!("✅ You're logged in as {}\n", user);
                    return Ok(Some(Session::for_user(user)));
                }
                Err(e) => {
                    warn!("Login attempt {} failed", attempt);
                    println!("❌ {}", e);
                }
            }
        }

        error!("Too many failed login attempts");
        Ok(None)
    }

    async fn chat_loop<R>(&self, lines: &mut Lines<R>, session: &mut Session) -> Result<Exit>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            let prompt = match session.city() {
                Some(city) => format!("[{}] > ", city),
                None => "> ".to_string(),
            };
            let Some(line) = prompt_line(lines, &prompt).await? else {
                return Ok(Exit::Quit);
            };

            match parse_command(&line) {
                Command::Empty => {}
                Command::Help => println!("{}", HELP_TEXT),
                Command::Cities => {
                    println!("Available cities: {}", self.advisor.datasets().names().join(", "))
                }
                Command::City(name) => self.select_city(session, &name),
                Command::Home => {
                    session.clear_city();
                    println!("🏠 Back to the homepage. Select a city with /city <name>.");
                }
                Command::Summary => self.with_dataset(session, |dataset| {
                    print_summary(dataset, session.summary());
                }),
                Command::Options => self.with_dataset(session, print_options),
                Command::Examples => self.with_dataset(session, |dataset| {
                    println!(
                        "{}",
                        questions::format_questions(&dataset.name, &dataset.example_questions)
                    )
                }),
                Command::Estimate {
                    neighbourhood,
                    room_type,
                } => match self.advisor.estimate(session, &neighbourhood, &room_type) {
                    Ok(estimate) => self.with_dataset(session, |dataset| {
                        if estimate.fallback {
                            print_fallback_notice(&neighbourhood, &room_type);
                        }
                        print_estimate(&dataset.currency, &estimate)
                    }),
                    Err(e) => println!("❌ {}", e),
                },
                Command::Map(path) => self.with_dataset(session, |dataset| {
                    let points = analysis::map_points(dataset);
                    match report::write_geojson(&dataset.name, &points, &path) {
                        Ok(()) => println!("🗺️  Wrote {} listings to {}", points.len(), path.display()),
                        Err(e) => println!("❌ {:#}", e),
                    }
                }),
                Command::Export(path) => {
                    let path = path.unwrap_or_else(|| self.default_export.clone());
                    let format = format_for_path(&path);
                    let result = self
                        .advisor
                        .report(session, self.chat.model_name())
                        .map_err(anyhow::Error::from)
                        .and_then(|r| report::write_session_report(&r, &path, format));
                    match result {
                        Ok(()) => println!("📝 Session saved to {}", path.display()),
                        Err(e) => println!("❌ {:#}", e),
                    }
                }
                Command::Prompt => match self.advisor.system_prompt(session) {
                    Ok(prompt) => println!("{}", prompt),
                    Err(e) => println!("❌ {}", e),
                },
                Command::Logout => return Ok(Exit::Logout),
                Command::Quit => return Ok(Exit::Quit),
                Command::Invalid(message) => println!("❌ {}", message),
                Command::Ask(message) => self.ask(session, &message).await,
            }
        }
    }

    fn select_city(&self, session: &mut Session, name: &str) {
        match self.advisor.select_city(session, name) {
            Ok(rows) => {
                let rows = rows.len();
                if let Ok(dataset) = self.advisor.current_dataset(session) {
                    println!(
                        "📍 Selected city: {} ({} listings, {} neighbourhood/room type groups)",
                        dataset.name,
                        dataset.len(),
                        rows
                    );
                }
                println!("Ask a question, or try /summary, /estimate, /map. /help lists everything.");
                if let Ok(dataset) = self.advisor.current_dataset(session) {
                    if let Some(hint) = examples_hint(session, dataset) {
                        println!("{}", hint);
                    }
                }
            }
            Err(e) => println!("❌ {}", e),
        }
    }

    fn with_dataset(&self, session: &Session, f: impl FnOnce(&CityDataset)) {
        match self.advisor.current_dataset(session) {
            Ok(dataset) => f(dataset),
            Err(e) => println!("❌ {}", e),
        }
    }

    async fn ask(&self, session: &mut Session, message: &str) {
        if session.city().is_none() {
            println!("❌ {}", SessionError::NoCitySelected);
            return;
        }

        let spinner = thinking_spinner();
        let result = self.advisor.ask(session, self.chat, message).await;
        spinner.finish_and_clear();

        match result {
            Ok(reply) => println!("\n🤖 {}\n", reply),
            Err(SessionError::Service(e)) => {
                error!("Chat request failed: {}", e);
                println!("{}", RETRY_MESSAGE);
            }
            Err(e) => println!("❌ {}", e),
        }
    }
}

/// Print a prompt and read one line. `None` at end of input.
async fn prompt_line<R>(lines: &mut Lines<R>, prompt: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let line = lines.next_line().await?;
    debug!("Read input line ({} bytes)", line.as_ref().map_or(0, String::len));
    Ok(line)
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Thinking...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn format_for_path(path: &std::path::Path) -> OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
        _ => OutputFormat::Markdown,
    }
}

fn print_banner() {
    println!("🏡 Airbnb Smart Investment Advisor");
    println!("   Data-driven answers on prices, revenue and neighbourhoods.");
    println!("   Type /help for commands.\n");
}

pub fn print_summary(dataset: &CityDataset, rows: &[SummaryRow]) {
    if rows.is_empty() {
        println!("No data available for {}.", dataset.name);
        return;
    }
    println!(
        "{}",
        crate::context::format_summary(&dataset.name, &dataset.currency, rows)
    );
}

/// Pointer to `/examples`, offered until the first question for the city.
pub fn examples_hint(session: &Session, dataset: &CityDataset) -> Option<String> {
    if session.question_asked() || dataset.example_questions.is_empty() {
        return None;
    }
    Some(format!(
        "💡 Not sure what to ask? Type /examples for typical questions about {}.",
        dataset.name
    ))
}

/// Line shown when an estimate fell back to the city-wide average.
pub fn fallback_notice(neighbourhood: &str, room_type: &str) -> String {
    format!(
        "ℹ️  No listings match '{}' / '{}'; using the city-wide average.",
        neighbourhood, room_type
    )
}

pub fn print_fallback_notice(neighbourhood: &str, room_type: &str) {
    println!("{}", fallback_notice(neighbourhood, room_type));
}

pub fn print_estimate(currency: &str, estimate: &PointEstimate) {
    println!(
        "💷 Estimated Nightly Price: {}{:.2}",
        currency, estimate.avg_price
    );
    println!(
        "📅 Estimated Monthly Revenue: {}{:.2}",
        currency, estimate.monthly_revenue
    );
}

pub fn print_options(dataset: &CityDataset) {
    println!("Neighbourhoods: {}", analysis::neighbourhoods(dataset).join(", "));
    println!("Room types: {}", analysis::room_types(dataset).join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, StaticCredentials};
    use crate::config::UserConfig;
    use crate::dataset::Datasets;
    use crate::errors::ServiceError;
    use crate::models::{ConversationTurn, Listing};
    use crate::session::AdvisorSettings;
    use async_trait::async_trait;
    use tokio::io::BufReader;

    struct EchoChat;

    #[async_trait]
    impl ChatService for EchoChat {
        async fn complete(
            &self,
            _system_prompt: &str,
            _history: &[ConversationTurn],
            user_message: &str,
        ) -> Result<String, ServiceError> {
            Ok(format!("echo: {}", user_message))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct DownChat;

    #[async_trait]
    impl ChatService for DownChat {
        async fn complete(
            &self,
            _system_prompt: &str,
            _history: &[ConversationTurn],
            _user_message: &str,
        ) -> Result<String, ServiceError> {
            Err(ServiceError::Auth("revoked".to_string()))
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn advisor() -> Advisor {
        Advisor::new(
            Datasets::new(vec![CityDataset::new(
                "London",
                "£",
                vec![
                    Listing::new("Soho", "Entire home", 100.0),
                    Listing::new("Camden", "Private room", 50.0),
                ],
            )
            .with_example_questions(questions::defaults_for("London"))]),
            AdvisorSettings {
                retry_backoff: Duration::ZERO,
                ..AdvisorSettings::default()
            },
        )
    }

    fn input(text: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(text.as_bytes()).lines()
    }

    #[test]
    fn test_parse_plain_text_is_a_question() {
        assert_eq!(
            parse_command("  Which area is best?  "),
            Command::Ask("Which area is best?".to_string())
        );
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/city Paris"), Command::City("Paris".to_string()));
        assert_eq!(parse_command("/CITY  New York "), Command::City("New York".to_string()));
        assert_eq!(parse_command("/home"), Command::Home);
        assert_eq!(parse_command("/examples"), Command::Examples);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/map out.geojson"), Command::Map(PathBuf::from("out.geojson")));
        assert_eq!(
            parse_command("/estimate Le Marais | Entire home/apt"),
            Command::Estimate {
                neighbourhood: "Le Marais".to_string(),
                room_type: "Entire home/apt".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_invalid_commands() {
        assert!(matches!(parse_command("/city"), Command::Invalid(_)));
        assert!(matches!(parse_command("/estimate Soho"), Command::Invalid(_)));
        assert!(matches!(parse_command("/estimate | Entire home"), Command::Invalid(_)));
        assert_eq!(parse_command("/export"), Command::Export(None));
        assert!(matches!(parse_command("/dance"), Command::Invalid(_)));
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(std::path::Path::new("s.JSON")), OutputFormat::Json);
        assert_eq!(format_for_path(std::path::Path::new("s.md")), OutputFormat::Markdown);
        assert_eq!(format_for_path(std::path::Path::new("session")), OutputFormat::Markdown);
    }

    #[tokio::test]
    async fn test_chat_session_end_to_end() {
        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None);
        let mut lines = input("/estimate Soho | Entire home\nHello\n/quit\n");

        let session = repl.run(&mut lines, Some("london")).await.unwrap();

        assert_eq!(session.city(), Some("London"));
        assert_eq!(session.last_estimate().map(|e| e.avg_price), Some(100.0));
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.transcript()[1].content, "echo: Hello");
    }

    #[tokio::test]
    async fn test_examples_hint_disappears_after_first_question() {
        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None);

        let mut lines = input("/examples\n/quit\n");
        let session = repl.run(&mut lines, Some("London")).await.unwrap();
        let dataset = advisor.current_dataset(&session).unwrap();
        let hint = examples_hint(&session, dataset).unwrap();
        assert!(hint.contains("/examples"));

        let mut lines = input("Which area is best?\n/city London\n/quit\n");
        let session = repl.run(&mut lines, Some("London")).await.unwrap();
        let dataset = advisor.current_dataset(&session).unwrap();
        assert!(session.question_asked());
        assert_eq!(examples_hint(&session, dataset), None);

        let mut lines = input("Which area is best?\n/home\n/city London\n/quit\n");
        let session = repl.run(&mut lines, None).await.unwrap();
        let dataset = advisor.current_dataset(&session).unwrap();
        assert!(examples_hint(&session, dataset).is_some());
    }

    #[test]
    fn test_no_hint_without_example_questions() {
        let dataset = CityDataset::new("Rome", "€", vec![Listing::new("Trastevere", "Private room", 80.0)]);
        assert_eq!(examples_hint(&Session::new(), &dataset), None);
    }

    #[tokio::test]
    async fn test_estimate_fallback_in_terminal() {
        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None);
        let mut lines = input("/estimate Mayfair | Castle\n/quit\n");

        let session = repl.run(&mut lines, Some("London")).await.unwrap();
        let estimate = session.last_estimate().unwrap();

        assert!(estimate.fallback);
        assert_eq!(estimate.avg_price, 75.0);
        assert_eq!(
            fallback_notice("Mayfair", "Castle"),
            "ℹ️  No listings match 'Mayfair' / 'Castle'; using the city-wide average."
        );
    }

    #[tokio::test]
    async fn test_questions_without_city_are_not_sent() {
        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None);
        let mut lines = input("Hello\n/city London\n/home\n");

        let session = repl.run(&mut lines, None).await.unwrap();

        assert_eq!(session.city(), None);
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_service_failure_keeps_transcript() {
        let advisor = advisor();
        let repl = Repl::new(&advisor, &DownChat, None);
        let mut lines = input("Hello\n");

        let session = repl.run(&mut lines, Some("London")).await.unwrap();
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_login_required() {
        let advisor = advisor();
        let credentials = StaticCredentials::new(&[UserConfig {
            username: "analyst".to_string(),
            password_sha256: hash_password("s3cret"),
        }]);
        let repl = Repl::new(&advisor, &EchoChat, Some(&credentials));

        let mut lines = input("analyst\nwrong\nanalyst\ns3cret\n/quit\n");
        let session = repl.run(&mut lines, Some("London")).await.unwrap();
        assert_eq!(session.username(), Some("analyst"));

        let mut lines = input("a\nb\nc\nd\ne\nf\n");
        let session = repl.run(&mut lines, None).await.unwrap();
        assert_eq!(session.username(), None);
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let advisor = advisor();
        let credentials = StaticCredentials::new(&[
            UserConfig {
                username: "first".to_string(),
                password_sha256: hash_password("one"),
            },
            UserConfig {
                username: "second".to_string(),
                password_sha256: hash_password("two"),
            },
        ]);
        let repl = Repl::new(&advisor, &EchoChat, Some(&credentials));

        let mut lines = input("first\none\nHi\n/logout\nsecond\ntwo\n/quit\n");
        let session = repl.run(&mut lines, Some("London")).await.unwrap();

        assert_eq!(session.username(), Some("second"));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_export_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let script = format!("Hello\n/export {}\n/quit\n", path.display());

        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None);
        let mut lines = BufReader::new(script.as_bytes()).lines();
        repl.run(&mut lines, Some("London")).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["model_used"], "echo");
        assert_eq!(value["transcript"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_bare_export_uses_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.md");

        let advisor = advisor();
        let repl = Repl::new(&advisor, &EchoChat, None).with_default_export(&path);
        let mut lines = input("/export\n/quit\n");
        repl.run(&mut lines, Some("London")).await.unwrap();

        let markdown = std::fs::read_to_string(&path).unwrap();
        assert!(markdown.starts_with("# London Investment Session"));
    }
}
