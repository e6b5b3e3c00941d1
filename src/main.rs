use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use voicecmd::{CommandStore, Config};

#[derive(Parser, Debug)]
#[command(name = "voicecmd")]
#[command(author, version, about = "Voice command manager - define phrases your AI agent acts on")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Command directory (overrides VOICECMD_DIR and the config file)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a command (replaces any command with the same id)
    Add {
        /// Phrase that triggers the command
        phrase: String,

        /// Shell command or instruction; "-" reads it from stdin
        action: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Other phrases for the same command, comma separated
        #[arg(short, long, default_value = "")]
        aliases: String,
    },

    /// List commands
    #[command(alias = "ls")]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a command file
    Show {
        /// Command id (file name without .md)
        id: String,
    },

    /// Delete a command
    #[command(alias = "rm")]
    Delete {
        /// Command id (file name without .md)
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the command directory
    Path,

    /// Start the browser command manager
    Serve {
        /// Port to listen on (default from config, 5555)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (default from config, 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate for
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    voicecmd::logging::init(cli.verbose);

    if let Command::Completion { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "voicecmd", &mut io::stdout());
        return;
    }

    let config = Config::load();
    let dir = config.store_dir(cli.dir.as_deref());

    if let Err(e) = run(cli.command, &config, dir) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Command, config: &Config, dir: PathBuf) -> Result<(), Box<dyn Error>> {
    if let Command::Path = command {
        println!("{}", dir.display());
        return Ok(());
    }

    let store = CommandStore::open(dir)?;

    match command {
        Command::Add {
            phrase,
            action,
            description,
            aliases,
        } => {
            let action = if action == "-" {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                action
            };

            let id = store.create(&phrase, &action, &description, &aliases)?;
            println!("{} {}", "Created command".green(), id.bold());
            println!("  Say: \"{}\"", phrase.trim());
            println!("  File: {}", store.path_for(&id).display());
        }

        Command::List { json } => {
            let commands = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&commands)?);
                return Ok(());
            }
            if commands.is_empty() {
                println!("No commands yet. Create one with: voicecmd add \"<phrase>\" \"<action>\"");
                return Ok(());
            }
            for cmd in &commands {
                println!(
                    "{:<24} {}  {}",
                    cmd.id.cyan(),
                    format!("\"{}\"", cmd.phrase).bold(),
                    cmd.description.dimmed()
                );
                if !cmd.aliases.is_empty() {
                    println!("{:<24} also: {}", "", cmd.aliases.join(", "));
                }
            }
            eprintln!("\n{} command(s) in {}", commands.len(), store.root().display());
        }

        Command::Show { id } => {
            print!("{}", store.read(&id)?);
        }

        Command::Delete { id, yes } => {
            // Report a missing command before asking about it
            store.read(&id)?;
            if !yes && !confirm(&format!("Delete command '{}'?", id))? {
                println!("Cancelled.");
                return Ok(());
            }
            store.delete(&id)?;
            println!("{} {}", "Deleted command".yellow(), id);
        }

        Command::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            voicecmd::serve::start_server(store, &host, port)?;
        }

        Command::Path | Command::Completion { .. } => {}
    }

    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
