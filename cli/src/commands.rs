use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};
use smartdc_cloudapi::{Client, CreateKey, CreateMachine, MachineAction, RequestOptions};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the account
    Account,
    /// Manage SSH keys
    Keys {
        #[command(subcommand)]
        command: KeyCommand,
    },
    /// Manage machines
    Machines {
        #[command(subcommand)]
        command: MachineCommand,
    },
    /// Inspect packages
    Packages {
        #[command(subcommand)]
        command: PackageCommand,
    },
    /// Manage images
    Images {
        #[command(subcommand)]
        command: ImageCommand,
    },
    /// Inspect networks
    Networks {
        #[command(subcommand)]
        command: NetworkCommand,
    },
    /// Inspect fabric VLANs
    Vlans {
        #[command(subcommand)]
        command: VlanCommand,
    },
    /// List datacenters
    Datacenters,
    /// Show usage for a period
    Usage {
        /// Billing period, `YYYY-MM`
        period: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    List,
    Get {
        name: String,
    },
    /// Upload a public key
    Add {
        /// Public key file
        file: String,
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MachineCommand {
    List {
        #[command(flatten)]
        filter: ListArgs,
    },
    /// Count machines without listing them
    Count {
        #[command(flatten)]
        filter: ListArgs,
    },
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        package: String,
        #[arg(long)]
        image: String,
        /// Network id, may be repeated
        #[arg(long = "network")]
        networks: Vec<String>,
    },
    Delete {
        id: String,
    },
    Start {
        id: String,
    },
    Stop {
        id: String,
    },
    Reboot {
        id: String,
    },
    Resize {
        id: String,
        package: String,
    },
    Rename {
        id: String,
        name: String,
    },
    /// Manage machine tags
    Tags {
        #[command(subcommand)]
        command: TagCommand,
    },
    /// Manage machine metadata
    Metadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },
    /// Manage machine snapshots
    Snapshots {
        #[command(subcommand)]
        command: SnapshotCommand,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    limit: Option<u64>,
    #[arg(long)]
    offset: Option<u64>,
    /// `key=value` filter, may be repeated
    #[arg(long = "filter", value_parser = parse_pair)]
    filters: Vec<(String, String)>,
}

impl ListArgs {
    fn options(&self) -> RequestOptions {
        let mut opts = RequestOptions::default();
        for (k, v) in &self.filters {
            opts = opts.with_query(k.as_str(), v);
        }
        if let Some(limit) = self.limit {
            opts = opts.with_query("limit", limit);
        }
        if let Some(offset) = self.offset {
            opts = opts.with_query("offset", offset);
        }
        opts
    }
}

#[derive(Subcommand, Debug)]
pub enum TagCommand {
    List {
        machine: String,
    },
    /// Add `key=value` tags
    Add {
        machine: String,
        #[arg(value_parser = parse_pair, required = true)]
        tags: Vec<(String, String)>,
    },
    /// Replace every tag with `key=value` tags
    Replace {
        machine: String,
        #[arg(value_parser = parse_pair, required = true)]
        tags: Vec<(String, String)>,
    },
    Get {
        machine: String,
        tag: String,
    },
    /// Delete one tag, or all of them when no tag is given
    Delete {
        machine: String,
        tag: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    List {
        machine: String,
    },
    /// Add `key=value` metadata
    Add {
        machine: String,
        #[arg(value_parser = parse_pair, required = true)]
        pairs: Vec<(String, String)>,
    },
    Get {
        machine: String,
        key: String,
    },
    Delete {
        machine: String,
        key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    List {
        machine: String,
    },
    Create {
        machine: String,
        #[arg(long)]
        name: Option<String>,
    },
    Get {
        machine: String,
        name: String,
    },
    /// Boot the machine from a snapshot
    Start {
        machine: String,
        name: String,
    },
    Delete {
        machine: String,
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    List,
    Get { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    List,
    Get {
        id: String,
    },
    /// Create an image from a stopped machine
    #[command(disable_version_flag = true)]
    Create {
        machine: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        version: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommand {
    List,
    Get { id: String },
}

#[derive(Subcommand, Debug)]
pub enum VlanCommand {
    List,
    Get {
        vlan_id: u16,
    },
    /// List the networks on a VLAN
    Networks {
        vlan_id: u16,
    },
}

fn parse_pair(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got `{s}`")),
    }
}

fn pairs_to_object(pairs: Vec<(String, String)>) -> Value {
    Value::Object(
        pairs
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect::<Map<_, _>>(),
    )
}

/// Run `cmd` and return what should be printed.
pub async fn run(client: &Client, cmd: Commands) -> Result<Value> {
    let opts = RequestOptions::default();

    let output = match cmd {
        Commands::Account => client.get_account(&opts).await?,
        Commands::Keys { command } => run_keys(client, command, &opts).await?,
        Commands::Machines { command } => run_machines(client, command, &opts).await?,
        Commands::Packages { command } => match command {
            PackageCommand::List => client.list_packages(&opts).await?,
            PackageCommand::Get { id } => client.get_package(id, &opts).await?,
        },
        Commands::Images { command } => match command {
            ImageCommand::List => client.list_images(&opts).await?,
            ImageCommand::Get { id } => client.get_image(id, &opts).await?,
            ImageCommand::Create {
                machine,
                name,
                version,
            } => {
                client
                    .create_image_from_machine(machine, &name, &version, &opts)
                    .await?
            }
            ImageCommand::Delete { id } => {
                client.delete_image(id, &opts).await?;
                Value::Null
            }
        },
        Commands::Networks { command } => match command {
            NetworkCommand::List => client.list_networks(&opts).await?,
            NetworkCommand::Get { id } => client.get_network(id, &opts).await?,
        },
        Commands::Vlans { command } => match command {
            VlanCommand::List => client.list_fabric_vlans(&opts).await?,
            VlanCommand::Get { vlan_id } => client.get_fabric_vlan(vlan_id, &opts).await?,
            VlanCommand::Networks { vlan_id } => {
                client.list_fabric_networks(vlan_id, &opts).await?
            }
        },
        Commands::Datacenters => client.list_datacenters(&opts).await?,
        Commands::Usage { period } => client.get_usage(&period, &opts).await?,
    };

    Ok(output)
}

async fn run_keys(client: &Client, cmd: KeyCommand, opts: &RequestOptions) -> Result<Value> {
    let output = match cmd {
        KeyCommand::List => client.list_keys(opts).await?,
        KeyCommand::Get { name } => client.get_key(name, opts).await?,
        KeyCommand::Add { file, name } => {
            let key = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read public key {file}"))?;
            let key = CreateKey {
                name,
                key: key.trim().to_string(),
            };
            client.create_key(&key, opts).await?
        }
        KeyCommand::Delete { name } => {
            client.delete_key(name, opts).await?;
            Value::Null
        }
    };
    Ok(output)
}

async fn run_machines(
    client: &Client,
    cmd: MachineCommand,
    opts: &RequestOptions,
) -> Result<Value> {
    let output = match cmd {
        MachineCommand::List { filter } => client.list_machines(&filter.options()).await?,
        MachineCommand::Count { filter } => {
            let count = client.count_machines(&filter.options()).await?;
            json!({ "count": count.count, "done": count.done })
        }
        MachineCommand::Get { id } => client.get_machine(id, opts).await?,
        MachineCommand::Create {
            name,
            package,
            image,
            networks,
        } => {
            let machine = CreateMachine {
                name,
                package,
                image,
                networks,
                extra: Map::new(),
            };
            client.create_machine(&machine, opts).await?
        }
        MachineCommand::Delete { id } => {
            client.delete_machine(id, opts).await?;
            Value::Null
        }
        MachineCommand::Start { id } => {
            client.machine_action(id, MachineAction::Start, opts).await?;
            Value::Null
        }
        MachineCommand::Stop { id } => {
            client.machine_action(id, MachineAction::Stop, opts).await?;
            Value::Null
        }
        MachineCommand::Reboot { id } => {
            client.machine_action(id, MachineAction::Reboot, opts).await?;
            Value::Null
        }
        MachineCommand::Resize { id, package } => {
            client.resize_machine(id, package, opts).await?;
            Value::Null
        }
        MachineCommand::Rename { id, name } => {
            client.rename_machine(id, &name, opts).await?;
            Value::Null
        }
        MachineCommand::Tags { command } => match command {
            TagCommand::List { machine } => client.list_machine_tags(machine, opts).await?,
            TagCommand::Add { machine, tags } => {
                client
                    .add_machine_tags(machine, pairs_to_object(tags), opts)
                    .await?
            }
            TagCommand::Replace { machine, tags } => {
                client
                    .replace_machine_tags(machine, pairs_to_object(tags), opts)
                    .await?
            }
            TagCommand::Get { machine, tag } => {
                client.get_machine_tag(machine, &tag, opts).await?
            }
            TagCommand::Delete { machine, tag } => {
                match tag {
                    Some(tag) => client.delete_machine_tag(machine, &tag, opts).await?,
                    None => client.delete_machine_tags(machine, opts).await?,
                }
                Value::Null
            }
        },
        MachineCommand::Metadata { command } => match command {
            MetadataCommand::List { machine } => {
                client.list_machine_metadata(machine, opts).await?
            }
            MetadataCommand::Add { machine, pairs } => {
                client
                    .add_machine_metadata(machine, pairs_to_object(pairs), opts)
                    .await?
            }
            MetadataCommand::Get { machine, key } => {
                client.get_machine_metadata(machine, &key, opts).await?
            }
            MetadataCommand::Delete { machine, key } => {
                client.delete_machine_metadata(machine, &key, opts).await?;
                Value::Null
            }
        },
        MachineCommand::Snapshots { command } => match command {
            SnapshotCommand::List { machine } => {
                client.list_machine_snapshots(machine, opts).await?
            }
            SnapshotCommand::Create { machine, name } => {
                client
                    .create_machine_snapshot(machine, name.as_deref(), opts)
                    .await?
            }
            SnapshotCommand::Get { machine, name } => {
                client.get_machine_snapshot(machine, &name, opts).await?
            }
            SnapshotCommand::Start { machine, name } => {
                client
                    .start_machine_from_snapshot(machine, &name, opts)
                    .await?;
                Value::Null
            }
            SnapshotCommand::Delete { machine, name } => {
                client.delete_machine_snapshot(machine, &name, opts).await?;
                Value::Null
            }
        },
    };
    Ok(output)
}
