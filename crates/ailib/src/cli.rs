//! Command handlers. Reports go to stdout, diagnostics to the log.
use ailib_core::kernel::error::Result;
use ailib_core::{AiLibraryManager, InterfaceKey, SkirmishAiKey};
use log::info;

pub fn list_interfaces(manager: &AiLibraryManager) -> Result<()> {
    print!("{}", manager.interfaces_report());
    Ok(())
}

pub fn list_skirmish_ais(manager: &AiLibraryManager) -> Result<()> {
    print!("{}", manager.skirmish_ais_report());
    Ok(())
}

fn resolve_key(
    manager: &AiLibraryManager,
    name: &str,
    version: Option<String>,
    interface: Option<String>,
    interface_version: Option<String>,
) -> Result<SkirmishAiKey> {
    let request = SkirmishAiKey::loose(name, version.unwrap_or_default()).with_interface(InterfaceKey::new(
        interface.unwrap_or_default(),
        interface_version.unwrap_or_default(),
    ));
    let resolved = manager.resolve_skirmish_ai_key(&request);
    if resolved.is_unspecified() {
        return Err(format!("No installed skirmish AI matches '{}'", name).into());
    }
    Ok(resolved)
}

pub fn resolve(
    manager: &AiLibraryManager,
    name: &str,
    version: Option<String>,
    interface: Option<String>,
    interface_version: Option<String>,
) -> Result<()> {
    let key = resolve_key(manager, name, version, interface, interface_version)?;
    println!("{}", key);
    Ok(())
}

pub fn check(manager: &mut AiLibraryManager, name: &str, version: Option<String>) -> Result<()> {
    let key = resolve_key(manager, name, version, None, None)?;
    info!("Checking skirmish AI {}", key);

    let entry_points = match manager.fetch_skirmish_ai_library(&key) {
        Some(library) => library.entry_points(),
        None => return Err(format!("Failed to load skirmish AI {}", key).into()),
    };
    println!("Loaded {}", key);
    println!("  entry points: {}", entry_points.join(", "));

    manager.release_skirmish_ai_library(&key);
    println!("Released {}", key);
    Ok(())
}
