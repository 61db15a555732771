//! campusync-client CLI entry point.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campusync_client::cli::assignments::AssignmentsAction;
use campusync_client::cli::resources::{parse_data, ResourceAction};
use campusync_client::cli::{Cli, Commands, OutputFormat};
use campusync_client::output::{format_output, pretty, Pretty};
use campusync_client::{Backend, Campus, FileUpload, Resource};
use campusync_core::resources::{Assignment, Record};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campusync_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config();
    let campus = Campus::from_config(&config);

    match &cli.command {
        Commands::Users(command) => run(&cli, &campus.users(), "Users", &command.action).await?,
        Commands::Courses(command) => {
            run(&cli, &campus.courses(), "Courses", &command.action).await?
        }
        Commands::Events(command) => run(&cli, &campus.events(), "Events", &command.action).await?,
        Commands::Enrollments(command) => {
            run(&cli, &campus.enrollments(), "Enrollments", &command.action).await?
        }
        Commands::Assignments(command) => {
            run_assignments(&cli, &campus.assignments(), &command.action).await?
        }
    }

    Ok(())
}

fn print_record<T: Record + Pretty>(cli: &Cli, heading: &str, record: &T) {
    match cli.format {
        OutputFormat::Json => println!("{}", format_output(record, cli.format)),
        OutputFormat::Pretty if heading.is_empty() => println!("{}", record.pretty()),
        OutputFormat::Pretty => println!("{}:\n{}", heading, record.pretty()),
    }
}

async fn run<T, B>(cli: &Cli, resource: &Resource<T, B>, heading: &str, action: &ResourceAction) -> anyhow::Result<()>
where
    T: Record + Pretty,
    B: Backend,
{
    match action {
        ResourceAction::List(args) => {
            let page = resource
                .list(&args.to_params())
                .await?
                .into_data()
                .context("list read was disabled")?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&page, cli.format)),
                OutputFormat::Pretty => println!("{}", pretty::format_page(heading, &page)),
            }
        }
        ResourceAction::Get { id } => {
            let record = resource
                .get(id)
                .await?
                .into_data()
                .with_context(|| format!("no record for id '{}'", id))?;
            print_record(cli, "", &record);
        }
        ResourceAction::Create { data } => {
            let record = resource.create(&parse_data(data)?).await?;
            print_record(cli, "Created", &record);
        }
        ResourceAction::Update { id, data } => {
            let record = resource.update(id, &parse_data(data)?).await?;
            print_record(cli, "Updated", &record);
        }
        ResourceAction::Delete { id } => {
            resource.delete(id).await?;
            if !cli.quiet {
                println!("Deleted {} {}", resource.descriptor().label.to_lowercase(), id);
            }
        }
    }
    Ok(())
}

async fn run_assignments<B: Backend>(
    cli: &Cli,
    resource: &Resource<Assignment, B>,
    action: &AssignmentsAction,
) -> anyhow::Result<()> {
    if let Some((id, transition)) = action.transition() {
        let record = resource.transition(id, transition).await?;
        print_record(cli, "Updated", &record);
        return Ok(());
    }

    match action {
        AssignmentsAction::Common(common) => run(cli, resource, "Assignments", common).await?,
        AssignmentsAction::Attach { id, path } => {
            let upload = FileUpload::from_path(path).await?;
            let record = resource.attach_file(id, upload).await?;
            print_record(cli, "Attached", &record);
        }
        AssignmentsAction::Detach { id, file_id } => {
            let record = resource.detach_file(id, file_id).await?;
            print_record(cli, "Detached", &record);
        }
        AssignmentsAction::Publish { .. }
        | AssignmentsAction::Unpublish { .. }
        | AssignmentsAction::CloseSubmissions { .. } => {}
    }
    Ok(())
}
