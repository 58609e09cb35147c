use clap::{App, Arg};
use dragonfly_demos::{
	config::Settings,
	demos::{self, snake, Snake},
	tick,
};
use std::process;

fn main() {
	let matches = App::new("Snake x Dragonfly")
		.about("Joins a multiplayer snake game whose rules run inside the store")
		.after_help("Arrows or WASD steer, R respawns, Q or Esc leaves.")
		.arg(
			Arg::with_name("name")
				.index(1)
				.required(true)
				.help("Player name shown on the scoreboard"),
		)
		.arg(
			Arg::with_name("host")
				.index(2)
				.help(&format!("Store host. Default is {}", Settings::HOST)),
		)
		.arg(
			Arg::with_name("port")
				.index(3)
				.help(&format!("Store port. Default is {}", Settings::PORT)),
		)
		.get_matches();

	if let Err(e) = logger::init_logger() {
		eprintln!("Can't open the log file: {}", e);
	}

	let name = matches.value_of("name").unwrap_or_default();
	if name.trim().is_empty() {
		eprintln!("Error: player name can't be blank");
		process::exit(1);
	}

	let settings = match Settings::new(snake::TICK)
		.with_address(matches.value_of("host"), matches.value_of("port"))
		.and_then(Settings::from_env)
	{
		Ok(settings) => settings,
		Err(e) => {
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	};

	match tick::play(Snake::for_terminal(name, demos::terminal_size()), settings) {
		Ok(farewell) => println!("{}", farewell),
		Err(e) => {
			log::error!("Snake stopped: {}", e);
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	}
}
