use application::chat_service::ChatService;
use application::static_questions::{RetryPolicy, StaticQuestionService};
use application::user_service::UserService;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::conversation::ChatTurn;
use domain::organization::Organization;
use infrastructure::config::Config;
use infrastructure::ollama_client::OllamaClient;
use infrastructure::prompt_store::PromptStore;
use infrastructure::providers::{EmbeddingProvider, LanguageModel};
use infrastructure::store::StoreRegistry;
use infrastructure::vector_index::VectorIndexStore;
use shared::confirmation::ask_confirmation;
use shared::types::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "orgchat")]
#[command(about = "Multi-tenant retrieval-augmented chatbot backend")]
pub struct Cli {
    /// Organization the command operates in; unknown names fall back to `general`.
    #[arg(long, global = true)]
    pub org: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Answer a single question for a user
    Ask {
        #[arg(long)]
        user: String,
        question: String,
    },
    /// Interactive chat session for a user
    Chat {
        #[arg(long)]
        user: String,
    },
    /// Create a user and build their vector index from a text file
    CreateUser {
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        text_file: PathBuf,
    },
    /// Replace a user's corpus and rebuild their vector index
    UpdateText {
        name: String,
        #[arg(long)]
        text_file: PathBuf,
    },
    /// Delete a user and their vector index
    DeleteUser {
        name: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List users of the organization
    ListUsers,
    /// Answer the canned question set and persist the results
    StaticCheck { name: String },
    /// Show the stored canned answers
    StaticAnswers { name: String },
}

pub struct CliApp {
    chat: Arc<ChatService>,
    statics: StaticQuestionService,
    users: UserService,
}

impl CliApp {
    pub fn new(config: &Config) -> Result<Self> {
        let registry = Arc::new(StoreRegistry::open(&config.data_dir)?);
        let client = OllamaClient::new(config);
        let llm: Arc<dyn LanguageModel> = Arc::new(client.clone());
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(client);
        let index = Arc::new(VectorIndexStore::new(registry.clone(), embedder));
        let prompts = Arc::new(PromptStore::new(&config.prompts_dir));
        let chat = Arc::new(ChatService::new(llm, prompts, index.clone()));
        Ok(Self {
            statics: StaticQuestionService::new(chat.clone(), registry.clone()),
            users: UserService::new(registry, index),
            chat,
        })
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        let organization = Organization::parse(cli.org.as_deref());
        match cli.command {
            Command::Ask { user, question } => {
                let history = [ChatTurn::new(question, "")];
                let answer = self.chat.answer(&user, organization, &history).await?;
                println!("{}", answer);
            }
            Command::Chat { user } => {
                self.run_chat_session(&user, organization).await?;
            }
            Command::CreateUser {
                name,
                password,
                text_file,
            } => {
                let text = std::fs::read_to_string(&text_file)?;
                self.users
                    .create_user(&name, &password, &text, organization)
                    .await?;
                println!("{}", format!("User {name} created").green());
            }
            Command::UpdateText { name, text_file } => {
                let text = std::fs::read_to_string(&text_file)?;
                self.users
                    .update_user_text(&name, &text, organization)
                    .await?;
                println!("{}", format!("Text updated for {name}").green());
            }
            Command::DeleteUser { name, yes } => {
                if !yes
                    && !ask_confirmation(
                        &format!("Delete user {name} and their index?"),
                        false,
                    )?
                {
                    println!("Aborted");
                    return Ok(());
                }
                self.users.delete_user(&name, organization)?;
                println!("{}", format!("User {name} deleted").yellow());
            }
            Command::ListUsers => {
                let users = self.users.list_users(organization)?;
                if users.is_empty() {
                    println!("No users in {organization}");
                }
                for user in users {
                    println!(
                        "{}  created {}  modifications {}",
                        user.name.bold(),
                        user.created_at,
                        user.modifications
                    );
                }
            }
            Command::StaticCheck { name } => {
                let answers = self
                    .statics
                    .answer_static_questions(&name, organization, RetryPolicy::default())
                    .await?;
                println!(
                    "{}",
                    format!("Stored {} static answers for {name}", answers.len()).green()
                );
            }
            Command::StaticAnswers { name } => {
                for (question, answer) in self.statics.static_answers_for(&name, organization)? {
                    println!("{}", question.bold());
                    println!("  {answer}");
                }
            }
        }
        Ok(())
    }

    async fn run_chat_session(&self, user: &str, organization: Organization) -> Result<()> {
        println!(
            "{}",
            format!("Chatting as {user} ({organization}); empty line or 'exit' to quit").dimmed()
        );
        let mut history: Vec<ChatTurn> = Vec::new();
        loop {
            print!("{} ", "you>".cyan());
            std::io::stdout().flush()?;
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                break;
            }
            let question = line.trim();
            if question.is_empty() || question == "exit" {
                break;
            }
            history.push(ChatTurn::new(question, ""));
            let answer = self.chat.answer(user, organization, &history).await?;
            if let Some(last) = history.last_mut() {
                last.answer = answer.clone();
            }
            println!("{} {}", "bot>".green(), answer);
        }
        Ok(())
    }
}
