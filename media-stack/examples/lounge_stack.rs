use std::sync::Arc;
use std::time::Duration;

use media_stack::sim::SimulatedPlatform;
use media_stack::{init_logging, LoggingMode, StackConfig, VirtualDevice};
use stack_model::{DeviceSnapshot, MediaMetadata, PlaybackState};

const CONFIG: &str = r#"{
    "name": "Lounge",
    "mapping": {
        "media_player.tv": {
            "HDMI 1": "media_player.lounge_room",
            "HDMI 2": "media_player.stereo"
        },
        "media_player.stereo": {
            "PVR": "media_player.bedroom",
            "AUX": "media_player.tv"
        }
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    println!("1. Building simulated devices...");
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_device(
                "media_player.tv",
                DeviceSnapshot::available()
                    .with_name("TV")
                    .with_source_list(["HDMI 1", "HDMI 2"])
                    .with_source("HDMI 1")
                    .with_volume(0.25),
            )
            .with_device(
                "media_player.stereo",
                DeviceSnapshot::available()
                    .with_name("Stereo")
                    .with_source_list(["PVR", "AUX"])
                    .with_source("AUX"),
            )
            .with_device(
                "media_player.bedroom",
                DeviceSnapshot::available()
                    .with_name("Bedroom")
                    .with_playback_state(PlaybackState::Playing)
                    .with_metadata(MediaMetadata::new().with_title("Evening News")),
            )
            .with_device(
                "media_player.lounge_room",
                DeviceSnapshot::available().with_name("Lounge Room"),
            ),
    );
    platform.apply_commands(true);
    println!("✓ 4 devices ready");

    println!("2. Creating virtual device...");
    let device = VirtualDevice::new(StackConfig::from_json_str(CONFIG)?, Arc::clone(&platform))?;
    let changes = device.iter();
    println!("✓ '{}' created", device.name());
    println!("  Chain:   {:?}", device.chain().devices());
    println!("  Sources: {:?}", device.source_list());
    println!("  Active:  {:?}", device.source());

    println!("\n3. Selecting 'Bedroom'...");
    device.select_source("Bedroom")?;
    for change in changes.timeout_iter(Duration::from_millis(200)) {
        println!(
            "  {} -> {} ({:?})",
            change.previous.active_source_device,
            change.current.active_source_device,
            change.current.playback_state
        );
    }
    println!("  Chain:   {:?}", device.chain().devices());

    println!("\n4. Sending commands...");
    device.pause()?;
    device.set_volume(0.4)?;
    for (target, command) in platform.sent_commands() {
        println!("  {} <- {}", target, command);
    }

    println!("\n5. Creating a source cycle...");
    platform.update("media_player.stereo", |stereo| {
        stereo.selected_source = Some("AUX".into())
    });
    device.flush()?;
    let chain = device.chain();
    println!(
        "  Chain:   {:?} ({:?})",
        chain.devices(),
        chain.termination()
    );
    println!("  State:   {:?}", device.state().playback_state);

    Ok(())
}
