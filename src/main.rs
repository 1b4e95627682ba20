use winit::keyboard::KeyCode;

use wealthview::aggregate::label_cap;
use wealthview::components::Target;
use wealthview::loading;
use wealthview::settings::ModifierKey;
use wealthview::ui::{FrameInput, ModifierFlags};
use wealthview::window::WealthWindow;
use wealthview::world::World;

const BUILTIN_COLONY: &str = include_str!("../data/colony.kdl");

fn modifier_flags(key: ModifierKey) -> ModifierFlags {
    let mut flags = ModifierFlags::NONE;
    match key {
        ModifierKey::None => {}
        ModifierKey::Alt => flags.alt = true,
        ModifierKey::Command => flags.command = true,
        ModifierKey::Control => flags.ctrl = true,
        ModifierKey::Shift => flags.shift = true,
    }
    flags
}

fn print_breakdown(window: &WealthWindow) {
    let tree = window.tree();
    println!("{:?}, range {:?}", window.group_mode(), window.view_range());
    for id in window.visible_nodes() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        println!(
            "  {}{:<20} ${:>8.0}  {} x ~${:.2}",
            if node.selected { "*" } else { " " },
            node.label,
            node.wealth,
            node.instance_count(),
            node.average_value()
        );
    }
    println!("{}", window.info_text());
}

fn print_targets(window: &WealthWindow, world: &World) {
    for target in window.targets(world).take(8) {
        match target {
            Target::Thing(id) => {
                if let Some(thing) = world.things.get(&id) {
                    println!("  -> {}", label_cap(&thing.label));
                }
            }
            Target::Cell(cell) => println!("  -> tile ({}, {})", cell.x, cell.y),
        }
    }
}

fn main() {
    env_logger::init();

    let settings = loading::load_settings("data/settings.ron");
    let world = loading::load_colony("data/colony.kdl").or_else(|| {
        log::warn!("falling back to the built-in colony");
        loading::parse_colony(BUILTIN_COLONY)
    });
    let Some(mut world) = world else {
        log::error!("no colony to show");
        return;
    };

    let modifiers = modifier_flags(settings.modifier_key);
    let mut window = WealthWindow::new(settings);

    // Release the hotkey to open the window.
    let mut input = FrameInput::new();
    input.keys_released.push(KeyCode::F8);
    input.modifiers = modifiers;
    window.frame(&world, input);
    if !window.is_open() {
        log::error!("hotkey did not open the window");
        return;
    }
    print_breakdown(&window);

    // Click the top row.
    let top = window
        .visible_nodes()
        .first()
        .and_then(|&id| window.tree().node(id))
        .map(|n| n.layout_rect);
    if let Some(r) = top {
        let click = FrameInput::click_at(r.x + r.width / 2.0, r.y + r.height / 2.0, ModifierFlags::NONE);
        window.frame(&world, click);
        println!();
        print_breakdown(&window);
        print_targets(&window, &world);
    }

    // Jump to the first target.
    let needle = window.targets(&world).next().and_then(|target| match target {
        Target::Thing(id) => world.things.get(&id).map(|t| format!("{}:", label_cap(&t.label))),
        Target::Cell(cell) => Some(format!("({}, {}):", cell.x, cell.y)),
    });
    if let Some(needle) = needle {
        let out = window.frame(&world, FrameInput::new());
        let row = out
            .draw
            .texts_containing(&needle)
            .next()
            .map(|t| (t.x + 1.0, t.y + t.height / 2.0));
        if let Some((x, y)) = row {
            let out = window.frame(&world, FrameInput::click_at(x, y, ModifierFlags::NONE));
            out.jump_camera(&mut world);
            println!("camera at {:?}", world.camera);
        }
    }

    // Ctrl+G groups by category.
    let mut input = FrameInput::new();
    input.keys_pressed.push(KeyCode::KeyG);
    input.modifiers = ModifierFlags::CTRL;
    window.frame(&world, input);
    println!();
    print_breakdown(&window);
}
