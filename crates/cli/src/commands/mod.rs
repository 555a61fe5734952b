use clap::Subcommand;
use exambox_config::VBoxConfig;
use exambox_vboxmanage::VBoxManage;

pub mod query;
pub mod run;
pub mod status;

#[derive(Subcommand)]
pub enum Commands {
    /// Summarise the hypervisor and VM state
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exit successfully iff the VM is registered
    Installed,

    /// Exit successfully iff the VM is running
    Running,

    /// Print the VBoxManage version
    Version,

    /// Read a guest property of the VM
    Property {
        /// Property name, e.g. /VirtualBox/GuestInfo/OS/Product
        name: String,
    },

    /// Extract a field from the machine-readable VM info
    Info {
        /// Regular expression whose first capture group is printed
        pattern: String,
    },

    /// Run a raw VBoxManage command through the serializer
    Run {
        /// Keep the command output out of the log
        #[arg(short, long)]
        quiet: bool,

        /// Arguments passed to VBoxManage
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
}

impl Commands {
    pub fn execute(self, config: &VBoxConfig) -> eyre::Result<()> {
        match self {
            // status reports a missing executable instead of failing on it
            Commands::Status { json } => status::execute(config, json),
            command => command.execute_with(&VBoxManage::new(config)?),
        }
    }

    fn execute_with(self, vbox: &VBoxManage) -> eyre::Result<()> {
        match self {
            Commands::Status { json } => status::print(&status::StatusReport::collect(vbox), json),
            Commands::Installed => query::installed(vbox),
            Commands::Running => query::running(vbox),
            Commands::Version => query::version(vbox),
            Commands::Property { name } => query::property(vbox, &name),
            Commands::Info { pattern } => query::info(vbox, &pattern),
            Commands::Run { quiet, args } => run::execute(vbox, args, quiet),
        }
    }
}
