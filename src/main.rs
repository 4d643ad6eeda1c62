use anyhow::{bail, Context};
use campaign_client::{
    config::{Config, LogFormat},
    dto::campaign_dto::{AudienceSelection, CampaignListQuery},
    error::Error,
    models::{
        campaign::{Campaign, CampaignDetails, CampaignStatus, RecipientStatus},
        session::Session,
    },
    services::{
        campaign_watcher::{CampaignDetailWatcher, CampaignListWatcher, FetchState, WatchOptions},
        import_service::CsvPreview,
        launch_service::LaunchBuilder,
        session_service::SessionStore,
    },
    utils::{
        csv::csv_template,
        status::{campaign_status_color, recipient_status_color},
        time,
    },
    AppContext,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Campaign console for the WhatsApp receptionist dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a recipient CSV against a template's variable count
    ValidateCsv {
        file: String,
        /// Number of dynamic variables the template expects
        #[arg(long)]
        variables: usize,
    },

    /// Print an upload template for a template with N variables
    TemplateCsv {
        #[arg(long)]
        variables: usize,
    },

    /// List campaigns
    Campaigns {
        #[arg(long)]
        status: Option<CampaignStatus>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        /// Keep refreshing while any campaign on the page is active
        #[arg(long)]
        watch: bool,
    },

    /// Show one campaign with its recipients
    Campaign {
        id: String,
        #[arg(long)]
        recipient_status: Option<RecipientStatus>,
        #[arg(long)]
        watch: bool,
    },

    /// List soft-deleted campaigns
    Deleted {
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Move a campaign to the deleted list
    Delete { id: String },

    /// Restore a soft-deleted campaign
    Restore { id: String },

    /// Permanently delete a campaign
    Purge { id: String },

    /// List approved message templates
    Templates,

    /// Launch a campaign
    Launch {
        #[arg(long)]
        name: String,
        #[arg(long)]
        template: String,
        /// Saved audience to send to
        #[arg(long, conflicts_with = "csv")]
        audience: Option<String>,
        /// Recipient CSV (mobile_number, variable_1, ...)
        #[arg(long)]
        csv: Option<String>,
        /// Template variable value, repeat once per placeholder
        #[arg(long = "var")]
        variables: Vec<String>,
        /// Schedule time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        at: Option<String>,
    },

    /// Store the access token used for API calls
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Forget the stored session
    Logout,
}

impl Commands {
    fn is_offline(&self) -> bool {
        matches!(self, Commands::ValidateCsv { .. } | Commands::TemplateCsv { .. })
    }

    fn is_session(&self) -> bool {
        matches!(self, Commands::Login { .. } | Commands::Logout)
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.command.is_offline() {
        init_tracing(LogFormat::Text);
        return run_offline(cli.command).await;
    }

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    if cli.command.is_session() {
        return run_session(&config, cli.command).await;
    }

    let ctx = AppContext::load(config).await?;
    let outcome = run(&ctx, cli.command).await;
    ctx.shutdown().await?;
    if let Err(e) = &outcome {
        print_hint(e);
    }
    outcome
}

fn print_hint(error: &anyhow::Error) {
    match error.downcast_ref::<Error>() {
        Some(e) if e.is_unauthorized() => {
            eprintln!("The backend rejected the session; sign in again with `campaign-client login --token ...`")
        }
        Some(e) if e.is_not_found() => {
            eprintln!("Nothing with that id; `campaign-client deleted` lists soft-deleted campaigns")
        }
        _ => {}
    }
}

async fn run_offline(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::ValidateCsv { file, variables } => {
            let preview = CsvPreview::from_file(&file, variables)
                .await
                .with_context(|| format!("Failed to read {}", file))?;
            print_preview(&preview);
            if !preview.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::TemplateCsv { variables } => print!("{}", csv_template(variables)),
        _ => unreachable!("online command routed offline"),
    }
    Ok(())
}

async fn run_session(config: &Config, command: Commands) -> anyhow::Result<()> {
    let store = SessionStore::new(&config.session_file);
    match command {
        Commands::Login {
            token,
            organization,
            email,
        } => {
            let session = Session {
                token: Some(token),
                organization_id: organization,
                user_email: email,
                signed_in_at: Some(time::now()),
            };
            store.save(&session).await?;
            info!(path = %store.path().display(), "Session stored");
        }
        Commands::Logout => store.clear().await?,
        _ => unreachable!("non-session command routed to session runner"),
    }
    Ok(())
}

async fn run(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    let options = WatchOptions {
        auto_refresh: true,
        refresh_interval: ctx.config.refresh_interval(),
    };

    match command {
        Commands::Campaigns {
            status,
            page,
            limit,
            watch,
        } => {
            let query = CampaignListQuery::new(limit.unwrap_or(ctx.config.page_limit))
                .with_status(status)
                .with_page(page);
            if watch {
                watch_campaigns(ctx, query, options).await;
            } else {
                let page = ctx.campaign_service.list_campaigns(&query).await?;
                print_campaigns(&page.campaigns, query.page, page.total_pages, page.total_items);
            }
        }
        Commands::Campaign {
            id,
            recipient_status,
            watch,
        } => {
            if watch {
                watch_campaign(ctx, id, recipient_status, options).await;
            } else {
                let details = ctx
                    .campaign_service
                    .get_campaign(&id, recipient_status)
                    .await?;
                print_details(&details);
            }
        }
        Commands::Deleted { page, limit } => {
            let query = CampaignListQuery::new(limit.unwrap_or(ctx.config.page_limit)).with_page(page);
            let page = ctx.campaign_service.list_deleted_campaigns(&query).await?;
            print_campaigns(&page.campaigns, query.page, page.total_pages, page.total_items);
        }
        Commands::Delete { id } => {
            ctx.campaign_service.soft_delete_campaign(&id).await?;
            println!("Campaign {} moved to deleted", id);
        }
        Commands::Restore { id } => {
            ctx.campaign_service.restore_campaign(&id).await?;
            println!("Campaign {} restored", id);
        }
        Commands::Purge { id } => {
            ctx.campaign_service.permanently_delete_campaign(&id).await?;
            println!("Campaign {} permanently deleted", id);
        }
        Commands::Templates => {
            for template in ctx.template_service.list_templates().await? {
                println!(
                    "{:<10} {:<32} {:<6} vars={}",
                    template.id,
                    template.name,
                    template.language.as_deref().unwrap_or("-"),
                    template.variable_count
                );
            }
        }
        Commands::Launch {
            name,
            template,
            audience,
            csv,
            variables,
            at,
        } => {
            let template = ctx.template_service.get_template(&template).await?;
            let mut builder = LaunchBuilder::new(name);
            builder = match (audience, csv) {
                (Some(audience_id), None) => builder.audience(audience_id).variables(variables),
                (None, Some(file)) => {
                    let preview = CsvPreview::from_file(&file, template.variable_count).await?;
                    if !preview.is_valid() {
                        print_preview(&preview);
                        bail!("CSV has {} invalid rows", preview.invalid_count());
                    }
                    builder.csv_recipients(preview.into_recipients())
                }
                _ => bail!("Pass exactly one of --audience or --csv"),
            };
            if let Some(at) = at {
                builder = builder.schedule_at(time::parse_schedule(&at)?);
            }

            let payload = builder.build(&template, time::now())?;
            let sample_values = match &payload.audience {
                AudienceSelection::Audience { .. } => Some(payload.variables.as_slice()),
                AudienceSelection::Csv { recipients } => {
                    recipients.first().map(|r| r.dynamic_variables.as_slice())
                }
            };
            if let Some(message) = sample_values.and_then(|values| template.render(values)) {
                println!("Message preview: {}", message);
            }
            let campaign = ctx.campaign_service.launch_campaign(&payload).await?;
            println!(
                "Launched campaign {} ({}), status {}",
                campaign.name,
                campaign.id,
                campaign_status_color(&campaign.status).paint(&campaign.status.to_string())
            );
        }
        Commands::ValidateCsv { .. }
        | Commands::TemplateCsv { .. }
        | Commands::Login { .. }
        | Commands::Logout => unreachable!("command routed to the API runner"),
    }
    Ok(())
}

async fn watch_campaigns(ctx: &AppContext, query: CampaignListQuery, options: WatchOptions) {
    let mut watcher = CampaignListWatcher::new(ctx.campaign_source(), query, options);
    let mut rx = watcher.subscribe();
    watcher.start();

    loop {
        tokio::select! {
            changed = rx.changed() => if changed.is_err() { break },
            _ = tokio::signal::ctrl_c() => break,
        }
        let snapshot = rx.borrow_and_update().clone();
        match snapshot.state {
            FetchState::Loaded => print_campaigns(
                &snapshot.campaigns,
                snapshot.query.page,
                snapshot.total_pages,
                snapshot.total_items,
            ),
            FetchState::Failed => {
                eprintln!("{}", snapshot.error.as_deref().unwrap_or_default())
            }
            FetchState::Idle | FetchState::Loading => continue,
        }
        if !options.auto_refresh || !snapshot.has_active() {
            break;
        }
    }
}

async fn watch_campaign(
    ctx: &AppContext,
    id: String,
    recipient_status: Option<RecipientStatus>,
    options: WatchOptions,
) {
    let mut watcher = CampaignDetailWatcher::new(ctx.campaign_source(), id, options);
    let mut rx = watcher.subscribe();
    watcher.set_recipient_status(recipient_status);

    loop {
        tokio::select! {
            changed = rx.changed() => if changed.is_err() { break },
            _ = tokio::signal::ctrl_c() => break,
        }
        let snapshot = rx.borrow_and_update().clone();
        match (&snapshot.state, &snapshot.campaign) {
            (FetchState::Loaded, Some(details)) => print_details(details),
            (FetchState::Failed, _) => {
                eprintln!("{}", snapshot.error.as_deref().unwrap_or_default())
            }
            _ => continue,
        }
        if !options.auto_refresh || !snapshot.is_active() {
            break;
        }
    }
}

fn print_campaigns(campaigns: &[Campaign], page: u32, total_pages: u32, total_items: u64) {
    println!(
        "{:<10} {:<28} {:<20} {:>8} {:>10} {:>6} {:>8}",
        "ID", "NAME", "STATUS", "AUDIENCE", "DELIVERED", "READ", "REPLIED"
    );
    for campaign in campaigns {
        let stats = campaign.statistics();
        let status = campaign_status_color(&campaign.status).paint(&campaign.status.to_string());
        println!(
            "{:<10} {:<28} {:<20} {:>8} {:>9}% {:>5}% {:>7}%",
            campaign.id,
            campaign.name,
            status,
            stats.total_audience,
            stats.delivered_percentage,
            stats.read_percentage,
            stats.replied_percentage
        );
    }
    println!("page {}/{} ({} campaigns)", page, total_pages.max(1), total_items);
}

fn print_details(details: &CampaignDetails) {
    let campaign = &details.campaign;
    let stats = campaign.statistics();
    println!(
        "{} [{}] {}",
        campaign.name,
        campaign.id,
        campaign_status_color(&campaign.status).paint(&campaign.status.to_string())
    );
    println!(
        "template: {}  scheduled: {}  created: {}",
        campaign.template_name.as_deref().unwrap_or("-"),
        time::display(campaign.scheduled_at),
        time::display(campaign.created_at)
    );
    println!(
        "audience {}  delivered {} ({}%)  read {} ({}%)  replied {} ({}%)",
        stats.total_audience,
        stats.delivered_count,
        stats.delivered_percentage,
        stats.read_count,
        stats.read_percentage,
        stats.replied_count,
        stats.replied_percentage
    );
    for recipient in &details.recipients {
        println!(
            "  {:<14} {:<20} {}",
            recipient.mobile_number,
            recipient_status_color(&recipient.status).paint(&recipient.status.to_string()),
            recipient.dynamic_variables.join(", ")
        );
    }
}

fn print_preview(preview: &CsvPreview) {
    println!(
        "{} rows: {} valid, {} invalid",
        preview.total_rows,
        preview.valid_count(),
        preview.invalid_count()
    );
    for error in preview.errors() {
        println!("  row {} ({}): {}", error.row, error.field, error.message);
    }
    for row in preview.sample(5) {
        println!("  {} -> {}", row.mobile_number, row.dynamic_variables.join(" | "));
    }
}
