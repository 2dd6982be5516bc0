use clap::{Parser, Subcommand};
use culinary_time_machine::{
    AppConfig, AppError, PipelineState, RecipeArchive, RecipeDraft, RecipeSession, SavedRecipe,
    StatusKind,
};
use log::debug;
use std::path::PathBuf;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

/// Discover a recipe from another era, complete with a picture
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Saved-recipe archive (overrides the configured path)
    #[arg(long, global = true)]
    archive: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a recipe from the given ingredients
    Generate {
        /// Ingredients to cook with
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Save the result to the archive
        #[arg(long)]
        save: bool,
        /// Write the generated image to this file
        #[arg(long)]
        image_out: Option<PathBuf>,
    },
    /// List saved recipes
    Saved,
    /// Print a saved recipe
    Show {
        /// Identifier shown by `saved`
        id: i64,
    },
    /// Line-oriented session: add, remove, generate, save, select
    Interactive,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    env_logger::init();
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let archive_path = cli
        .archive
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.archive.path));
    debug!("Using archive at {}", archive_path.display());
    let mut archive = RecipeArchive::open(archive_path);

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Saved => print_saved(&archive),
        Command::Show { id } => match archive.select(id) {
            Some(saved) => print_draft(&saved.draft),
            None => eprintln!("No saved recipe with id {id}"),
        },
        Command::Generate {
            ingredients,
            save,
            image_out,
        } => {
            let mut session = RecipeSession::builder().config(config).build()?;
            for ingredient in &ingredients {
                // Duplicates are reported on the status line and otherwise ignored
                if session.add_ingredient(ingredient).is_err() {
                    print_status(&session);
                }
            }
            session.generate().await?;
            print_state(&session);
            print_status(&session);

            if let (Some(path), PipelineState::Ready { image: Some(image), .. }) =
                (image_out, session.state())
            {
                match image.decode_bytes() {
                    Ok(bytes) => {
                        tokio::fs::write(&path, bytes).await?;
                        println!("Image written to {}", path.display());
                    }
                    Err(e) => eprintln!("Image payload is not valid base64: {e}"),
                }
            }
            if save {
                session.save(&mut archive)?;
                print_status(&session);
            }
        }
        Command::Interactive => {
            let session = RecipeSession::builder().config(config).build()?;
            interactive(session, &mut archive).await?;
        }
    }

    Ok(())
}

async fn interactive(
    mut session: RecipeSession,
    archive: &mut RecipeArchive,
) -> Result<(), AppError> {
    println!("Culinary Time Machine. Type `help` for commands.");
    let mut lines = BufReader::new(stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => continue,
            "help" => print_help(),
            "add" => {
                for item in rest.split(',') {
                    let _ = session.add_ingredient(item);
                }
                print_ingredients(&session);
            }
            "remove" => {
                session.remove_ingredient(rest);
                print_ingredients(&session);
            }
            "list" => print_ingredients(&session),
            "generate" => {
                if session.generate().await.is_ok() {
                    print_state(&session);
                }
            }
            "save" => {
                let _ = session.save(archive);
            }
            "saved" => print_saved(archive),
            "select" => match rest.parse::<i64>() {
                Ok(id) => {
                    if session.select(archive, id).is_ok() {
                        print_state(&session);
                    }
                }
                Err(_) => eprintln!("usage: select <id>"),
            },
            "status" => print_state(&session),
            "quit" | "exit" => break,
            other => eprintln!("Unknown command `{other}`. Type `help` for commands."),
        }
        print_status(&session);
    }

    Ok(())
}

fn print_help() {
    println!("  add <a, b, ...>   add ingredients");
    println!("  remove <name>     remove an ingredient");
    println!("  list              show ingredients");
    println!("  generate          generate a recipe and its picture");
    println!("  save              save the recipe on display");
    println!("  saved             list saved recipes");
    println!("  select <id>       display a saved recipe");
    println!("  status            show the current recipe");
    println!("  quit              leave");
}

fn print_status(session: &RecipeSession) {
    if let Some(message) = session.status() {
        match message.kind {
            StatusKind::Error => eprintln!("[{}] {}", message.kind, message.text),
            _ => println!("[{}] {}", message.kind, message.text),
        }
    }
}

fn print_ingredients(session: &RecipeSession) {
    let items: Vec<&str> = session.ingredients().iter().map(String::as_str).collect();
    println!("Ingredients: {}", items.join(", "));
}

fn print_state(session: &RecipeSession) {
    match session.state() {
        PipelineState::Idle => println!("Your culinary adventure awaits!"),
        PipelineState::FetchingRecipe => println!("Unearthing a forgotten recipe..."),
        PipelineState::FetchingImage { draft } => {
            print_draft(draft);
            println!("Conjuring image...");
        }
        PipelineState::Ready { draft, image } => {
            print_draft(draft);
            match image {
                Some(image) => println!(
                    "\nImage: {} ({} base64 chars)",
                    image.mime_type,
                    image.data.len()
                ),
                None => println!("\nImage not available for this recipe."),
            }
        }
        // The cause is in the log; the status line carries the user-facing text
        PipelineState::Failed { .. } => eprintln!("No recipe this time."),
    }
}

fn print_draft(draft: &RecipeDraft) {
    println!("\n[{}] {}", draft.era, draft.recipe_name);
    println!("{}", draft.description);
    println!("Fun Fact: {}", draft.fun_fact);
    println!("\nIngredients");
    for item in &draft.ingredients {
        println!("  - {item}");
    }
    println!("\nInstructions");
    for (i, step) in draft.instructions.iter().enumerate() {
        println!("  {}. {step}", i + 1);
    }
}

fn print_saved(archive: &RecipeArchive) {
    if archive.is_empty() {
        println!("You haven't saved any recipes yet.");
        return;
    }
    for SavedRecipe { id, draft, .. } in archive.recipes() {
        println!("{id}  {}  ({})", draft.recipe_name, draft.era);
    }
}
