pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("guardia")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("GUARDIA_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("store")
                .short('s')
                .long("store")
                .help("Path to the credential store file")
                .default_value("data/mfa-store.json")
                .env("GUARDIA_STORE"),
        )
        .arg(
            Arg::new("issuer")
                .short('i')
                .long("issuer")
                .help("Issuer name embedded in otpauth:// URIs")
                .default_value("Guardia")
                .env("GUARDIA_ISSUER"),
        );

    logging::with_args(command)
}
