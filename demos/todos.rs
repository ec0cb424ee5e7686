//! To-do list state that survives restarts.
//!
//! Run it twice: the second run picks up where the first left off.

use keepsake::{FileStorage, PersistedStore, Store};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Todo {
    id: u32,
    name: String,
    completed: bool,
}

fn initial_todos() -> Vec<Todo> {
    vec![
        Todo {
            id: 1,
            name: "Visit MDN web docs".to_string(),
            completed: true,
        },
        Todo {
            id: 2,
            name: "Complete the Svelte Tutorial".to_string(),
            completed: false,
        },
    ]
}

fn stats(todos: &[Todo]) -> (usize, usize, usize) {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();
    (total, total - completed, completed)
}

fn print_todos(todos: &[Todo]) {
    for todo in todos {
        let status = if todo.completed { "✓" } else { " " };
        println!("   [{}] {} (#{})", status, todo.name, todo.id);
    }
}

fn main() -> keepsake::Result<()> {
    env_logger::init();

    println!("=== Persisted Store Example: Todo App ===\n");

    let path = std::env::temp_dir().join("keepsake-todos.json");
    let storage = FileStorage::open(&path)?;
    println!("Storage document: {}\n", path.display());

    let alert = Store::new("Welcome to the To-Do list app!".to_string());
    let todos = PersistedStore::new(storage, "mdn-svelte-todo", initial_todos())?;

    println!("1. Setting up subscribers");
    let _alert_sub = alert.subscribe(|message| println!("   [Alert] {message}"));
    let _todos_sub = todos.subscribe(|todos| {
        let (total, active, completed) = stats(todos);
        println!("   [Todos] Total: {total}, Active: {active}, Completed: {completed}");
    });

    println!("\n2. Current todos:");
    todos.read(|todos| print_todos(todos));

    println!("\n3. Adding a todo");
    let name = format!("Run this demo again ({})", todos.read(|t| t.len()) + 1);
    todos.update(|todos| {
        let id = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        todos.push(Todo {
            id,
            name: name.clone(),
            completed: false,
        });
    })?;
    alert.set(format!("Todo '{name}' has been added"));

    println!("\n4. Completing every active todo");
    todos.update(|todos| {
        for todo in todos.iter_mut() {
            todo.completed = true;
        }
    })?;
    alert.set("All todos completed".to_string());

    println!("\n5. Current todos:");
    todos.read(|todos| print_todos(todos));

    println!("\n✓ Example complete! Delete {} to start over.", path.display());
    Ok(())
}
