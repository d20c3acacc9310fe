//! Command-line surface over the service layer.
//!
//! Every command prints the server's JSON pretty-printed on stdout. The
//! listing commands take `--summary` for one line per record instead.

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use collab_exercises::config::{API_URL_VAR, ConfigError, SESSION_FILE_VAR};
use collab_exercises::display::{Difficulty, ExerciseFilter, SUBJECTS, initials, time_ago};
use collab_exercises::error::ErrorCode;
use collab_exercises::gateway::{Gateway, GatewayError, HttpMethod, MultipartPayload, RequestOptions};
use collab_exercises::services::exercises::NewExercise;
use collab_exercises::services::profile::ProfileUpdate;
use collab_exercises::services::{
    ServiceError, Submission, auth, comments, exercises, profile, saved, solutions,
};
use collab_exercises::types::{Exercise, Ref};
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid multipart argument '{0}' (expected name=value)")]
    InvalidField(String),
    #[error("invalid --header '{0}' (expected 'Name: value')")]
    InvalidHeader(String),
    #[error("could not read attachment {}: {source}", path.display())]
    Attachment { path: PathBuf, source: std::io::Error },
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Service(e) => e.error_code(),
            Self::Gateway(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::InvalidJson(_) | Self::InvalidField(_) | Self::InvalidHeader(_) => "E_INVALID_INPUT",
            Self::Attachment { .. } => "E_ATTACHMENT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Service(e) => e.retryable(),
            Self::Gateway(e) => e.retryable(),
            _ => false,
        }
    }
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "collab-exercises", about = "Collaborative exercises platform client")]
pub struct Cli {
    #[arg(long, global = true, env = API_URL_VAR)]
    pub api_url: Option<String>,

    #[arg(long, global = true, env = SESSION_FILE_VAR)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and log in.
    Register(RegisterArgs),
    /// Log in and store the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "COLLAB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Send a raw request through the gateway.
    Request(RequestArgs),
    /// Subjects offered when creating an exercise.
    Subjects,
    Exercises(ExercisesCommand),
    Comments(CommentsCommand),
    Solutions(SolutionsCommand),
    Saved(SavedCommand),
    Profile(ProfileCommand),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "COLLAB_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Defaults to `--password`.
    #[arg(long)]
    pub confirm_password: Option<String>,
    #[arg(long, default_value_t = false)]
    pub accept_terms: bool,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Endpoint relative to the API URL, e.g. `/exercises`.
    pub endpoint: String,
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: HttpMethod,
    /// JSON body.
    #[arg(long, conflicts_with_all = ["field", "file"])]
    pub data: Option<String>,
    /// Multipart text field `name=value`; repeatable.
    #[arg(long)]
    pub field: Vec<String>,
    /// Multipart file field `name=path`; repeatable.
    #[arg(long)]
    pub file: Vec<String>,
    /// Extra header `Name: value`; repeatable.
    #[arg(long, short = 'H')]
    pub header: Vec<String>,
    /// Attach the stored bearer token.
    #[arg(long, default_value_t = false)]
    pub auth: bool,
}

#[derive(Args, Debug)]
pub struct ExercisesCommand {
    #[command(subcommand)]
    pub command: ExercisesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ExercisesSubcommand {
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    /// Exercise with comments, solutions and saved state.
    Show {
        id: String,
    },
    Mine {
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        difficulty: Difficulty,
        #[arg(long)]
        file: Vec<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct CommentsCommand {
    #[command(subcommand)]
    pub command: CommentsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CommentsSubcommand {
    List { exercise_id: String },
    Add(SubmissionArgs),
}

#[derive(Args, Debug)]
pub struct SolutionsCommand {
    #[command(subcommand)]
    pub command: SolutionsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SolutionsSubcommand {
    List { exercise_id: String },
    Add(SubmissionArgs),
    Mine,
}

#[derive(Args, Debug)]
pub struct SubmissionArgs {
    pub exercise_id: String,
    #[arg(long)]
    pub text: String,
    #[arg(long)]
    pub file: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SavedCommand {
    #[command(subcommand)]
    pub command: SavedSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SavedSubcommand {
    List {
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    Check { exercise_id: String },
    Toggle { exercise_id: String },
}

#[derive(Args, Debug)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProfileSubcommand {
    Show,
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Delete the account. Requires `--yes`.
    Delete {
        #[arg(long, required = true)]
        yes: bool,
    },
}

// =============================================================================
// DISPATCH
// =============================================================================

pub async fn run(gateway: &Gateway, command: Command) -> Result<(), CliError> {
    match command {
        Command::Register(args) => {
            let confirm_password = args.confirm_password.unwrap_or_else(|| args.password.clone());
            let form = auth::Registration {
                name: args.name,
                email: args.email,
                password: args.password,
                confirm_password,
                accepted_terms: args.accept_terms,
            };
            let credential = auth::register(gateway, &form).await?;
            print_json(&credential.user)
        }
        Command::Login { email, password } => {
            let credential = auth::login(gateway, &email, &password).await?;
            print_json(&credential.user)
        }
        Command::Logout => Ok(auth::logout(gateway)?),
        Command::Whoami => {
            let credential = auth::current_user(gateway)?;
            println!("{} {} <{}>", initials(&credential.user.name), credential.user.name, credential.user.email);
            Ok(())
        }
        Command::Request(args) => run_request(gateway, args).await,
        Command::Subjects => {
            SUBJECTS.iter().for_each(|subject| println!("{subject}"));
            Ok(())
        }
        Command::Exercises(cmd) => run_exercises(gateway, cmd.command).await,
        Command::Comments(cmd) => match cmd.command {
            CommentsSubcommand::List { exercise_id } => print_json(&comments::list(gateway, &exercise_id).await?),
            CommentsSubcommand::Add(args) => {
                let submission = Submission::new(args.text).with_files(args.file);
                print_json(&comments::create(gateway, &args.exercise_id, submission).await?)
            }
        },
        Command::Solutions(cmd) => match cmd.command {
            SolutionsSubcommand::List { exercise_id } => print_json(&solutions::list(gateway, &exercise_id).await?),
            SolutionsSubcommand::Add(args) => {
                let submission = Submission::new(args.text).with_files(args.file);
                print_json(&solutions::create(gateway, &args.exercise_id, submission).await?)
            }
            SolutionsSubcommand::Mine => print_json(&solutions::mine(gateway).await?),
        },
        Command::Saved(cmd) => match cmd.command {
            SavedSubcommand::List { summary } => {
                let items = saved::list(gateway).await?;
                if summary {
                    let now = OffsetDateTime::now_utc();
                    items.iter().for_each(|item| println!("{}", exercise_line(&item.exercise, now)));
                    Ok(())
                } else {
                    print_json(&items)
                }
            }
            SavedSubcommand::Check { exercise_id } => print_json(&saved::is_saved(gateway, &exercise_id).await?),
            SavedSubcommand::Toggle { exercise_id } => print_json(&saved::toggle(gateway, &exercise_id).await?),
        },
        Command::Profile(cmd) => match cmd.command {
            ProfileSubcommand::Show => print_json(&profile::me(gateway).await?),
            ProfileSubcommand::Update { name, email } => {
                print_json(&profile::update(gateway, &ProfileUpdate { name, email }).await?)
            }
            ProfileSubcommand::Delete { .. } => {
                profile::delete_account(gateway).await?;
                eprintln!("account deleted");
                Ok(())
            }
        },
    }
}

async fn run_exercises(gateway: &Gateway, command: ExercisesSubcommand) -> Result<(), CliError> {
    match command {
        ExercisesSubcommand::List { search, subject, summary } => {
            let filter = ExerciseFilter { query: search, subject };
            print_exercises(&exercises::list(gateway, &filter).await?, summary)
        }
        ExercisesSubcommand::Show { id } => print_json(&exercises::detail(gateway, &id).await?),
        ExercisesSubcommand::Mine { summary } => print_exercises(&exercises::mine(gateway).await?, summary),
        ExercisesSubcommand::Create { title, description, subject, difficulty, file } => {
            let form = NewExercise {
                title,
                description,
                subject: canonical_subject(&subject),
                difficulty: difficulty.label().to_owned(),
                files: file,
            };
            print_json(&exercises::create(gateway, form).await?)
        }
        ExercisesSubcommand::Delete { id } => print_json(&exercises::delete(gateway, &id).await?),
    }
}

async fn run_request(gateway: &Gateway, args: RequestArgs) -> Result<(), CliError> {
    let mut options = RequestOptions::get().method(args.method);
    if let Some(data) = args.data {
        options = options.json(serde_json::from_str::<Value>(&data)?);
    } else if !args.field.is_empty() || !args.file.is_empty() {
        let mut payload = MultipartPayload::new();
        for raw in &args.field {
            let (name, value) = split_pair(raw, '=').ok_or_else(|| CliError::InvalidField(raw.clone()))?;
            payload.push_text(name, value);
        }
        for raw in &args.file {
            let (name, path) = split_pair(raw, '=').ok_or_else(|| CliError::InvalidField(raw.clone()))?;
            let path = PathBuf::from(path);
            payload
                .attach_path(name, &path)
                .await
                .map_err(|source| CliError::Attachment { path, source })?;
        }
        options = options.multipart(payload);
    }
    for raw in &args.header {
        let (name, value) = split_pair(raw, ':').ok_or_else(|| CliError::InvalidHeader(raw.clone()))?;
        options = options.header(name, value.trim_start());
    }
    if args.auth {
        options = options.authenticated();
    }
    print_json(&gateway.request(&args.endpoint, options).await?)
}

// =============================================================================
// OUTPUT
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_exercises(list: &[Exercise], summary: bool) -> Result<(), CliError> {
    if !summary {
        return print_json(list);
    }
    let now = OffsetDateTime::now_utc();
    list.iter().for_each(|exercise| println!("{}", exercise_line(exercise, now)));
    Ok(())
}

/// `id  title  [subject, difficulty]  by author  age  saves`.
pub fn exercise_line(exercise: &Exercise, now: OffsetDateTime) -> String {
    let difficulty = match Difficulty::classify(&exercise.difficulty) {
        Some(bucket) => bucket.label(),
        None => exercise.difficulty.as_str(),
    };
    let author = exercise.created_by.as_ref().map_or("User", Ref::display_name);
    let mut line = format!(
        "{}  {}  [{}, {}]  by {author}",
        exercise.key().unwrap_or("-"),
        exercise.title,
        exercise.subject,
        difficulty,
    );
    let age = time_ago(exercise.created_at.as_deref(), now);
    if !age.is_empty() {
        line.push_str("  ");
        line.push_str(&age);
    }
    let _ = write!(line, "  {} saved", exercise.saves());
    line
}

/// Catalogue spelling of a subject when it matches one, otherwise as typed.
pub fn canonical_subject(raw: &str) -> String {
    let raw = raw.trim();
    SUBJECTS
        .iter()
        .find(|subject| subject.eq_ignore_ascii_case(raw))
        .map_or_else(|| raw.to_owned(), |subject| (*subject).to_owned())
}

/// `name<sep>value` with a non-blank name.
fn split_pair(raw: &str, separator: char) -> Option<(&str, &str)> {
    raw.split_once(separator)
        .filter(|(name, _)| !name.trim().is_empty())
        .map(|(name, value)| (name.trim(), value))
}
