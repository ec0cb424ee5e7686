//! Selecting an input's text when it gains focus.

use keepsake::action::{select_on_focus, VirtualElement};

fn main() {
    env_logger::init();

    println!("=== Action Example: select on focus ===\n");

    let input = VirtualElement::input("Complete the Svelte Tutorial");
    let label = VirtualElement::div();

    let mut action = select_on_focus(Some(&input)).expect("inputs are selectable");
    println!("1. Attached to <{}>: {:?}", input.tag(), action.state());
    println!(
        "2. Attached to <{}>: {}",
        label.tag(),
        select_on_focus(Some(&label)).is_some()
    );

    input.focus();
    println!("3. After focus, selection = {:?}", input.selection());

    input.blur();
    input.set_value("Edited");
    input.focus();
    println!("4. After refocus, selection = {:?}", input.selection());

    action.destroy();
    input.blur();
    input.set_value("Edited again");
    input.focus();
    println!(
        "5. After destroy ({:?}), selection = {:?}",
        action.state(),
        input.selection()
    );

    println!("\n✓ Example complete!");
}
