use std::io;
use std::process;

use first_opengl::interface::desktop::DesktopPlatform;
use first_opengl::logging::init_logging;

fn main() {
    init_logging();

    let mut platform = DesktopPlatform::new();
    let stdout = io::stdout();

    let result = first_opengl::run(&mut platform, &mut stdout.lock());

    if result.is_err() {
        process::exit(-1);
    }
}
