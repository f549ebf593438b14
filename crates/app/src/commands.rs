//! Slash commands typed at the prompt.

use shared::models::ModelType;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    New,
    List,
    /// 1-based index into the conversation list
    Select(usize),
    Delete(usize),
    Rename(usize, String),
    Models,
    Model(ModelType),
    Attach { path: PathBuf, text: String },
    Image(String),
    Help,
    Quit,
    /// Anything that is not a command is a chat message
    Say(String),
}

pub const HELP: &str = "\
Commandes:
  /new                  nouvelle conversation
  /list                 lister les conversations
  /select N             ouvrir la conversation N
  /delete N             supprimer la conversation N
  /rename N TITRE       renommer la conversation N
  /models               modèles disponibles
  /model ID             changer de modèle
  /attach CHEMIN [TEXTE] envoyer une image ou un PDF
  /image DESCRIPTION    générer une image
  /quit                 quitter";

fn index(arg: &str) -> Result<usize, String> {
    match arg.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("numéro de conversation invalide: {}", arg.trim())),
    }
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    match name {
        "new" => Ok(Command::New),
        "list" => Ok(Command::List),
        "select" => index(args).map(Command::Select),
        "delete" => index(args).map(Command::Delete),
        "rename" => {
            let (n, title) = args
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: /rename N TITRE".to_string())?;
            Ok(Command::Rename(index(n)?, title.trim().to_string()))
        }
        "models" => Ok(Command::Models),
        "model" => args
            .parse::<ModelType>()
            .map(Command::Model)
            .map_err(|e| e.to_string()),
        "attach" => {
            if args.is_empty() {
                return Err("usage: /attach CHEMIN [TEXTE]".to_string());
            }
            let (path, text) = match args.split_once(char::is_whitespace) {
                Some((path, text)) => (path, text.trim()),
                None => (args, ""),
            };
            Ok(Command::Attach {
                path: PathBuf::from(path),
                text: text.to_string(),
            })
        }
        "image" => Ok(Command::Image(args.to_string())),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("commande inconnue: /{}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(parse("  bonjour  ").unwrap(), Command::Say("bonjour".into()));
    }

    #[test]
    fn test_indexed_commands() {
        assert_eq!(parse("/select 2").unwrap(), Command::Select(2));
        assert_eq!(parse("/delete 1").unwrap(), Command::Delete(1));
        assert!(parse("/select 0").is_err());
        assert!(parse("/delete abc").is_err());
        assert_eq!(
            parse("/rename 3 Vacances au Japon").unwrap(),
            Command::Rename(3, "Vacances au Japon".into())
        );
        assert!(parse("/rename 3").is_err());
    }

    #[test]
    fn test_model_command() {
        assert_eq!(
            parse("/model gemini-2.0-flash").unwrap(),
            Command::Model(ModelType::Gemini20Flash)
        );
        assert!(parse("/model gpt-4").is_err());
    }

    #[test]
    fn test_attach_command() {
        assert_eq!(
            parse("/attach photo.png que vois-tu ?").unwrap(),
            Command::Attach {
                path: PathBuf::from("photo.png"),
                text: "que vois-tu ?".into()
            }
        );
        assert_eq!(
            parse("/attach doc.pdf").unwrap(),
            Command::Attach {
                path: PathBuf::from("doc.pdf"),
                text: String::new()
            }
        );
        assert!(parse("/attach").is_err());
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse("/new").unwrap(), Command::New);
        assert_eq!(parse("/image un renard").unwrap(), Command::Image("un renard".into()));
        assert_eq!(parse("/exit").unwrap(), Command::Quit);
        assert!(parse("/unknown").is_err());
    }
}
