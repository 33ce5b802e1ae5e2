use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

/// Build an `md2html` command with color disabled.
pub fn md2html_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("md2html"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}
