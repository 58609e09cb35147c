use clap::{App, Arg};
use dragonfly_demos::{
	config::Settings,
	demos::{self, fire, Fire},
	tick,
};
use std::process;

fn main() {
	let matches = App::new("DOOM fire x Dragonfly")
		.about("Shows the DOOM fire effect computed by a Lua script inside the store")
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

	let settings = match Settings::new(fire::TICK)
		.with_address(matches.value_of("host"), matches.value_of("port"))
		.and_then(Settings::from_env)
	{
		Ok(settings) => settings,
		Err(e) => {
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	};

	match tick::play(Fire::for_terminal(demos::terminal_size()), settings) {
		Ok(farewell) => println!("{}", farewell),
		Err(e) => {
			log::error!("Fire stopped: {}", e);
			eprintln!("Error: {}", e);
			process::exit(1);
		}
	}
}
