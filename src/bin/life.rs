use clap::{App, Arg};
use dragonfly_demos::{
	config::Settings,
	demos::{self, life, Life},
	tick,
};
use std::process;

fn main() {
	let matches = App::new("Game of Life x Dragonfly")
		.about("Runs Conway's Game of Life inside the store and draws it with braille")
		.arg(
			Arg::with_name("host")
				.index(1)
				.help(&format!("Store host. Default is {}", Settings::HOST)),
		)
		.arg(
			Arg::with_name("port")
				.index(2)
				.help(&format!("Store port. Default is {}", Settings::PORT)),
		)
		.get_matches();

	if let Err(e) = logger::init_logger() {
		eprintln!("Can't open the log file: {}", e);
	}

	let settings = match Settings::new(life::TICK)
		.with_address(matches.value_of("host"), matches.value_of("port"))
		.and_then(Settings::from_env)
	{
		Ok(settings) => settings,
		Err(e) => {
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	};

	match tick::play(Life::for_terminal(demos::terminal_size()), settings) {
		Ok(farewell) => println!("{}", farewell),
		Err(e) => {
			log::error!("Life stopped: {}", e);
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	}
}
