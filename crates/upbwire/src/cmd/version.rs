use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("upbwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: upbwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("UPBWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("UPBWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("max_frame_len: {}", upbwire_frame::MAX_FRAME_LEN);
    println!("max_payload: {}", upbwire_frame::MAX_PAYLOAD);

    Ok(SUCCESS)
}
