use std::io::{self, Write};
use ragvec::{InMemoryStore, Metadata};

const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, PartialEq)]
pub enum Command {
    Upsert { id: String, vec: Vec<f32>, metadata: Metadata },
    Query { vec: Vec<f32>, top_k: usize },
    Get { id: String },
    Count,
}

/// Parse a command from a provided argument vector
/// args[0] is the program name, args[1] the command
pub fn parse_command_from_args(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command provided. Use: upsert, query, get, count".to_string());
    }

    let command = &args[1];

    match command.as_str() {
        "upsert" => parse_upsert(args),
        "query" => parse_query(args),
        "get" => parse_get(args),
        "count" => Ok(Command::Count),
        _ => Err(format!("Unknown command: {}. Available: upsert, query, get, count", command)),
    }
}

fn parse_vector(components: &[String]) -> Result<Vec<f32>, String> {
    components.iter()
        .map(|s| s.parse::<f32>().map_err(|_| format!("Not a number: '{}'", s)))
        .collect()
}

/// Parse the 'upsert' command
/// Usage: upsert <id> <v1> <v2> ... [--meta <json object>]
fn parse_upsert(args: &[String]) -> Result<Command, String> {
    if args.len() < 4 {
        return Err("'upsert' requires an ID and a vector. Usage: upsert <id> <v1> <v2> ... [--meta <json>]".to_string());
    }

    let id = args[2].clone();
    let meta_flag = args[3..].iter().position(|a| a == "--meta").map(|pos| pos + 3);
    let vector_end = meta_flag.unwrap_or(args.len());

    let metadata = match meta_flag {
        Some(pos) => {
            // JSON may contain spaces, so the flag swallows the rest of the line
            let raw = args[pos + 1..].join(" ");
            serde_json::from_str::<Metadata>(&raw)
                .map_err(|e| format!("--meta must be a JSON object: {}", e))?
        }
        None => Metadata::new(),
    };

    let vec = parse_vector(&args[3..vector_end])?;
    if vec.is_empty() {
        return Err("Upsert vector cannot be empty".to_string());
    }

    Ok(Command::Upsert { id, vec, metadata })
}

/// Parse the 'query' command
/// Usage: query <v1> <v2> ... [--top_k <number>]
fn parse_query(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'query' requires at least one vector component. Usage: query <v1> <v2> ... [--top_k <number>]".to_string());
    }

    let mut top_k = DEFAULT_TOP_K;
    let mut vector_end = args.len();

    if args.len() >= 4 && args[args.len() - 2] == "--top_k" {
        match args[args.len() - 1].parse::<usize>() {
            Ok(k) => {
                top_k = k;
                vector_end = args.len() - 2;
            }
            Err(_) => {
                return Err(format!("Invalid --top_k value: '{}'. Must be a non-negative integer.", args[args.len() - 1]));
            }
        }
    }

    let vec = parse_vector(&args[2..vector_end])?;
    if vec.is_empty() {
        return Err("Query vector cannot be empty".to_string());
    }

    Ok(Command::Query { vec, top_k })
}

/// Parse the 'get' command
/// Usage: get <id>
fn parse_get(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'get' command requires an ID. Usage: get <id>".to_string());
    }

    Ok(Command::Get { id: args[2].clone() })
}

/// REPL mode - interactive session against an in-memory store
pub fn run_repl(store: &InMemoryStore) {
    println!("ragvec - Similarity Search Store");
    println!("Type 'help' for commands, 'exit' or 'quit' to quit\n");

    loop {
        print!("ragvec> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        if input == "help" {
            print_help();
            continue;
        }

        let mut args: Vec<String> = vec!["ragvec".to_string()];
        args.extend(input.split_whitespace().map(|s| s.to_string()));

        match parse_command_from_args(&args) {
            Ok(command) => execute_command(store, command),
            Err(error) => eprintln!("Error: {}", error),
        }
    }
}

fn execute_command(store: &InMemoryStore, command: Command) {
    match command {
        Command::Upsert { id, vec, metadata } => {
            match store.upsert(id.clone(), vec, metadata) {
                Ok(()) => println!("Upserted '{}'", id),
                Err(error) => eprintln!("Error: {}", error),
            }
        }

        Command::Query { vec, top_k } => {
            match store.query(&vec, top_k) {
                Ok(results) => {
                    if results.is_empty() {
                        println!("No results found");
                    } else {
                        println!("Top {} results:", results.len());
                        for (rank, hit) in results.iter().enumerate() {
                            println!("{}. ID: {}, Score: {:.4}, Metadata: {}",
                                rank + 1, hit.id, hit.score, serde_json::Value::Object(hit.metadata.clone()));
                        }
                    }
                }
                Err(error) => eprintln!("Error: {}", error),
            }
        }

        Command::Get { id } => {
            match store.get(&id) {
                Some(record) => println!("Record '{}': {:?} {}", id, record.vector, serde_json::Value::Object(record.metadata)),
                None => eprintln!("Error: Record '{}' not found", id),
            }
        }

        Command::Count => println!("{}", store.len()),
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  upsert <id> <v1> <v2> ... [--meta <json>] - Store a record");
    println!("  query <v1> <v2> ... [--top_k N]          - Top-k similarity search (default k=3)");
    println!("  get <id>                                  - Show the first record with this ID");
    println!("  count                                     - Show record count");
    println!("  help                                      - Show this help");
    println!("  exit, quit                                - Exit the program");
}
