use chrono::NaiveDate;
use hatim_planner::{
    AuthProvider, HatimId, HatimPatch, HatimStore, LocalHatims, LocalStorage, Participant,
    PlannerConfig, SqliteAuthProvider, SqliteHatimRepository, TOTAL_PAGES,
    calculate_reading_progress, calculate_stats, dates, export, logging, reading_grid, start_page_of,
};
use polars::prelude::{AnyValue, DataFrame};
use std::fs::File;
use std::io::{self, Write};
use std::sync::Arc;

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        cells.push(
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect(),
        );
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_line = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(s.chars().count());
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_line(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  list                               List hatims of the current session\n  new [name...]                      Create a hatim and open it\n  open <id>                          Open a hatim by id\n  show                               Show the open hatim's reading grid\n  name <text...>                     Rename the open hatim\n  dates <start> <end>                Set the reading range (YYYY-MM-DD)\n  dates clear                        Clear the reading range\n  add <pages> <name...>              Append a participant\n  edit <n> <pages> <name...>         Change participant n\n  remove <n>                         Remove participant n\n  move <from> <to>                   Move a participant in the reading order\n  check <n> <YYYY-MM-DD>             Toggle a read day for participant n\n  stats                              Show page totals and reading progress\n  delete [id]                        Delete a hatim (default: the open one)\n  export csv <path>                  Write the schedule spreadsheet\n  export pdf <path> [n]              Write the PDF layout (whole group or participant n)\n  signup <email> <password>          Register an account\n  signin <email> <password>          Sign in and load your hatims\n  signout                            Return to guest mode\n  whoami                             Show the current session\n  quit|exit                          Exit"
    );
}

/// Participant numbers on the command line are 1-based.
fn parse_number(s: Option<&str>) -> Option<usize> {
    s.and_then(|v| v.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .map(|n| n - 1)
}

fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(dates::parse_date)
}

fn parse_id(raw: &str) -> HatimId {
    match raw.parse::<HatimId>() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn print_list(store: &HatimStore) {
    if store.hatims().is_empty() {
        println!("No hatims yet. Use 'new <name>' to create one.");
        return;
    }
    for hatim in store.hatims() {
        let stats = calculate_stats(&hatim.participants);
        println!(
            "{}  {}  participants={} pages={}/{}",
            hatim.id,
            hatim.name,
            hatim.participants.len(),
            stats.total,
            TOTAL_PAGES
        );
    }
}

fn print_hatim(store: &HatimStore, id: &HatimId) {
    let Some(hatim) = store.get(id).cloned().or_else(|| store.load(id)) else {
        println!("Hatim {id} not found.");
        return;
    };
    let range = match (hatim.start_date, hatim.end_date) {
        (Some(start), Some(end)) => format!("{start} .. {end}"),
        _ => "no dates".to_string(),
    };
    println!("{} [{}] ({range})", hatim.name, hatim.id);
    match reading_grid(&hatim) {
        Ok(grid) => match grid.to_dataframe() {
            Ok(df) => println!("{}", render_df_as_text_table(&df)),
            Err(e) => println!("Error rendering grid: {e}"),
        },
        Err(_) => {
            for (index, participant) in hatim.participants.iter().enumerate() {
                println!(
                    "  {}. {} ({} pages, starts at page {})",
                    index + 1,
                    participant.full_name,
                    participant.pages,
                    start_page_of(&hatim.participants, index)
                );
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();
    let config = PlannerConfig::from_env()?;
    let auth = SqliteAuthProvider::new(&config.db_path)?;
    let remote = SqliteHatimRepository::new(&config.db_path)?;
    let local = LocalHatims::new(LocalStorage::file(&config.local_storage_path));
    let mut store = HatimStore::new(Arc::new(remote), local);
    store.begin_session(auth.current_user());
    store.load_all();

    let mut current: Option<HatimId> = None;

    println!("Hatim Planner (CLI) - type 'help' for commands\n");
    print_list(&store);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        // commands below operate on the open hatim
        let needs_open = matches!(
            cmd,
            "show" | "name" | "dates" | "add" | "edit" | "remove" | "move" | "check" | "stats"
                | "export"
        );
        if needs_open && current.is_none() {
            println!("No hatim open. Use 'new' or 'open <id>' first.");
            continue;
        }

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "list" => {
                store.load_all();
                print_list(&store);
            }
            "new" => match store.create(&rest_of_line(parts)) {
                Ok(id) => {
                    println!("Created hatim {id}.");
                    current = Some(id);
                }
                Err(e) => println!("Error creating hatim: {e}"),
            },
            "open" => match parts.next() {
                Some(raw) => {
                    let id = parse_id(raw);
                    if store.get(&id).is_some() || store.load(&id).is_some() {
                        print_hatim(&store, &id);
                        current = Some(id);
                    } else {
                        println!("Hatim {id} not found.");
                    }
                }
                None => println!("Usage: open <id>"),
            },
            "show" => {
                if let Some(id) = &current {
                    print_hatim(&store, id);
                }
            }
            "name" => {
                let name = rest_of_line(parts);
                if name.is_empty() {
                    println!("Usage: name <text...>");
                    continue;
                }
                if let Some(id) = &current {
                    match store.update(id, HatimPatch::name(name)) {
                        Ok(()) => println!("Hatim renamed."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "dates" => {
                let first = parts.next();
                let patch = if first == Some("clear") {
                    HatimPatch::dates(None, None)
                } else {
                    match (parse_date(first), parse_date(parts.next())) {
                        (Some(start), Some(end)) if start <= end => {
                            HatimPatch::dates(Some(start), Some(end))
                        }
                        (Some(_), Some(_)) => {
                            println!("Start date must be on or before end date.");
                            continue;
                        }
                        _ => {
                            println!("Usage: dates <YYYY-MM-DD> <YYYY-MM-DD> | dates clear");
                            continue;
                        }
                    }
                };
                if let Some(id) = &current {
                    match store.update(id, patch) {
                        Ok(()) => println!("Dates updated."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "add" => {
                let Some(pages) = parts.next().and_then(|p| p.parse::<u32>().ok()) else {
                    println!("Usage: add <pages> <name...>");
                    continue;
                };
                let name = rest_of_line(parts);
                if let Some(id) = &current {
                    match store.add_participant(id, Participant::new(name, pages)) {
                        Ok(()) => println!("Participant added."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
            }
            "edit" => {
                let index = parse_number(parts.next());
                let pages = parts.next().and_then(|p| p.parse::<u32>().ok());
                let name = rest_of_line(parts);
                match (index, pages, &current) {
                    (Some(index), Some(pages), Some(id)) => {
                        match store.update_participant(id, index, &name, pages) {
                            Ok(()) => println!("Participant updated."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: edit <n> <pages> <name...>"),
                }
            }
            "remove" => match (parse_number(parts.next()), &current) {
                (Some(index), Some(id)) => match store.remove_participant(id, index) {
                    Ok(removed) => println!("Removed {}.", removed.full_name),
                    Err(e) => println!("Error: {e}"),
                },
                _ => println!("Usage: remove <n>"),
            },
            "move" => {
                let from = parse_number(parts.next());
                let to = parse_number(parts.next());
                match (from, to, &current) {
                    (Some(from), Some(to), Some(id)) => {
                        match store.move_participant(id, from, to) {
                            Ok(()) => println!("Participant moved."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: move <from> <to>"),
                }
            }
            "check" => {
                let index = parse_number(parts.next());
                let date = parse_date(parts.next());
                match (index, date, &current) {
                    (Some(index), Some(date), Some(id)) => {
                        match store.toggle_checked_day(id, index, date) {
                            Ok(true) => println!("Marked {date} as read."),
                            Ok(false) => println!("Unmarked {date}."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: check <n> <YYYY-MM-DD>"),
                }
            }
            "stats" => {
                let hatim = current
                    .as_ref()
                    .and_then(|id| store.get(id).cloned().or_else(|| store.load(id)));
                match hatim {
                    Some(hatim) => {
                        let stats = calculate_stats(&hatim.participants);
                        let progress = calculate_reading_progress(
                            &hatim.participants,
                            hatim.start_date,
                            hatim.end_date,
                        );
                        println!("Total pages     : {}", stats.total);
                        println!("Remaining pages : {}", stats.remaining);
                        println!("Cycle complete  : {:.2}%", stats.percentage);
                        println!("Reading progress: {progress:.2}%");
                    }
                    None => println!("Hatim not found."),
                }
            }
            "delete" => {
                let target = parts
                    .next()
                    .map(parse_id)
                    .or_else(|| current.clone());
                match target {
                    Some(id) => match store.delete(&id) {
                        Ok(()) => {
                            println!("Deleted hatim {id}.");
                            if current.as_ref() == Some(&id) {
                                current = None;
                            }
                        }
                        Err(e) => println!("Error deleting hatim: {e}"),
                    },
                    None => println!("Usage: delete [id]"),
                }
            }
            "export" => {
                let kind = parts.next();
                let path = parts.next();
                let participant = parse_number(parts.next());
                let hatim = current
                    .as_ref()
                    .and_then(|id| store.get(id).cloned().or_else(|| store.load(id)));
                let (Some(kind), Some(path), Some(hatim)) = (kind, path, hatim) else {
                    println!("Usage: export <csv|pdf> <path> [n]");
                    continue;
                };
                let result: Result<(), Box<dyn std::error::Error>> = match kind {
                    "csv" => export::build_spreadsheet(&hatim)
                        .and_then(|doc| doc.write_csv(File::create(path)?))
                        .map_err(Into::into),
                    "pdf" => {
                        let built = match participant {
                            Some(index) => export::build_personal_pdf(&hatim, index),
                            None => export::build_schedule_pdf(&hatim),
                        };
                        built
                            .and_then(|pdf| pdf.definition.to_json())
                            .map_err(Into::into)
                            .and_then(|json| std::fs::write(path, json).map_err(Into::into))
                    }
                    other => {
                        println!("Unknown export format '{other}'");
                        continue;
                    }
                };
                match result {
                    Ok(()) => println!("Exported {kind} to {path}"),
                    Err(e) => println!("Export error: {e}"),
                }
            }
            "signup" => match (parts.next(), parts.next()) {
                (Some(email), Some(password)) => match auth.sign_up(email, password) {
                    Ok(user) => println!("Registered {}. Use 'signin' to continue.", user.email),
                    Err(e) => println!("Sign-up failed: {e}"),
                },
                _ => println!("Usage: signup <email> <password>"),
            },
            "signin" => match (parts.next(), parts.next()) {
                (Some(email), Some(password)) => match auth.sign_in(email, password) {
                    Ok(user) => {
                        store.begin_session(Some(user.clone()));
                        store.load_all();
                        current = None;
                        println!("Signed in as {}.", user.email);
                        print_list(&store);
                    }
                    Err(e) => println!("Sign-in failed: {e}"),
                },
                _ => println!("Usage: signin <email> <password>"),
            },
            "signout" => match auth.sign_out() {
                Ok(()) => {
                    store.begin_session(None);
                    store.load_all();
                    current = None;
                    println!("Signed out. Guest mode.");
                }
                Err(e) => println!("Sign-out failed: {e}"),
            },
            "whoami" => match store.session() {
                Some(user) => println!("Signed in as {} ({})", user.email, user.id),
                None => println!("Guest session"),
            },
            other => println!("Unknown command '{other}'. Type 'help'."),
        }
    }
    Ok(())
}
