use eyre::WrapErr;
use exambox_vboxmanage::VBoxManage;
use regex::Regex;

pub fn installed(vbox: &VBoxManage) -> eyre::Result<()> {
    let installed = vbox.is_vm_installed()?;
    println!("{installed}");
    exit_unless(installed)
}

pub fn running(vbox: &VBoxManage) -> eyre::Result<()> {
    let running = vbox.is_vm_running()?;
    println!("{running}");
    exit_unless(running)
}

pub fn version(vbox: &VBoxManage) -> eyre::Result<()> {
    println!("{}", vbox.version()?);
    Ok(())
}

pub fn property(vbox: &VBoxManage, name: &str) -> eyre::Result<()> {
    println!("{}", vbox.guest_property(name));
    Ok(())
}

pub fn info(vbox: &VBoxManage, pattern: &str) -> eyre::Result<()> {
    let pattern =
        Regex::new(pattern).wrap_err_with(|| format!("invalid pattern '{pattern}'"))?;
    println!("{}", vbox.vm_info_by_regex(&pattern));
    Ok(())
}

fn exit_unless(condition: bool) -> eyre::Result<()> {
    if !condition {
        std::process::exit(1);
    }
    Ok(())
}
