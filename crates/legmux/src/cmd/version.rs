use legmux_record::{DEFAULT_DELAY, PAYLOAD_SIZE, RECORD_SIZE};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("legmux {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: legmux");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("LEGMUX_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("record_size: {RECORD_SIZE}");
    println!("payload_size: {PAYLOAD_SIZE}");
    println!("default_delay: {DEFAULT_DELAY}");
    println!("features: cli={}", cfg!(feature = "cli"));

    Ok(SUCCESS)
}
