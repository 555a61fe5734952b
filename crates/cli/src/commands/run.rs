use exambox_vboxmanage::{VBoxCommand, VBoxManage};

pub fn execute(vbox: &VBoxManage, args: Vec<String>, quiet: bool) -> eyre::Result<()> {
    let command = VBoxCommand::from_vec(args);
    tracing::info!(command = %command, "Running VBoxManage command");

    let output = if quiet {
        vbox.run_command_without_logging(&command)
    } else {
        vbox.run_command(&command)
    };

    match output {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(e) => {
            // Show the CLI's own diagnostics before the error report
            if let Some(output) = e.output() {
                eprint!("{output}");
            }
            Err(e.into())
        }
    }
}
