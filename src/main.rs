use std::{env, fs::read_to_string, process::exit, time::Instant};

use stlc::{
    display_error,
    errors::errors::Error,
    interpreter::interpreter::interpret,
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::{gradual, security},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let (file_path, security_mode) = match args.len() {
        2 => (args[1].clone(), false),
        3 if args[2] == "--security" => (args[1].clone(), true),
        _ => {
            eprintln!("Usage: stlc <file> [--security]");
            exit(1);
        }
    };

    let file_name = if file_path.contains('/') {
        file_path.split('/').next_back().unwrap().to_string()
    } else {
        file_path.clone()
    };

    let source = read_to_string(&file_path).expect("Failed to read file!");

    println!("+--------------------+");
    for (index, line) in source.lines().enumerate() {
        let code = line.trim();
        if code.is_empty() || code.starts_with(';') {
            continue;
        }

        println!("Code: {}", code);
        if let Err(error) = run_program(code, &file_name, security_mode) {
            display_error(&error, index + 1, line);
        }
        println!("+--------------------+");
    }
}

fn run_program(code: &str, file_name: &str, security_mode: bool) -> Result<(), Error> {
    let start = Instant::now();

    let tokens = tokenize(code.to_string(), Some(String::from(file_name)))?;
    for token in &tokens {
        token.debug();
    }

    let ast = parse(tokens)?;
    log::debug!("AST: {:?}", ast);

    if security_mode {
        let security_type = security::type_check(&ast)?;
        println!("Type: {}", security_type);

        let result = interpret(&ast)?;
        println!("Result: {}", result);
    } else {
        let (ty, rewritten) = gradual::type_check(ast)?;
        println!("Type: {}", ty);

        let result = interpret(&rewritten)?;
        println!("Result: {}", result);
    }

    log::debug!("Program processed in {:?}", start.elapsed());
    Ok(())
}
