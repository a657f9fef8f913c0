//! Thin command-line front end: load a URL, print what the renderer would
//! draw. The real rendering sink is external; `--display-list` dumps the
//! positioned runs it would consume.

use std::process::ExitCode;

use browser::{Options, Page};

fn main() -> ExitCode {
    env_logger::init();

    let mut dump_display_list = false;
    let mut url = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--display-list" => dump_display_list = true,
            _ if url.is_none() => url = Some(arg),
            _ => {
                eprintln!("usage: skiff [--display-list] <url>");
                return ExitCode::FAILURE;
            }
        }
    }
    let Some(url) = url else {
        eprintln!("usage: skiff [--display-list] <url>");
        return ExitCode::FAILURE;
    };

    let options = Options {
        cache_dir: Some(".cache".into()),
        ..Options::default()
    };

    let page = match Page::load(&url, &options) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("skiff: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(title) = page.title() {
        println!("# {title}");
    }
    if dump_display_list {
        for item in page.display_list() {
            println!(
                "{:8.1} {:8.1} {}pt {:?} {:?}  {}",
                item.x, item.y, item.font.size, item.font.weight, item.font.slant, item.text
            );
        }
    } else {
        println!("{}", page.text());
    }
    ExitCode::SUCCESS
}
