use clap::Parser;
use dialoguer::{FuzzySelect, Input, Select};
use episode_browser::{
    Browser, BrowserConfig, CatalogProvider, DEFAULT_BASE_URL, DEFAULT_SHOW, Episode, EpisodeCard,
    EpisodeCount, EpisodeKey, EpisodeRenderer, NetworkError, ShowId, open_browser,
};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Browse TV shows and their episodes from the TVMaze catalog
#[derive(Debug, Parser)]
#[command(name = "episode-browser", version, about)]
struct Cli {
    /// Base URL of the catalog API
    #[arg(long, env = "TVMAZE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Catalog id of the show to open
    #[arg(long, default_value_t = DEFAULT_SHOW)]
    show: ShowId,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print the episodes matching a search term and exit
    #[arg(long, conflicts_with = "episode")]
    search: Option<String>,

    /// Print a single episode, given as S01E02, and exit
    #[arg(long)]
    episode: Option<EpisodeKey>,

    /// Print all shows of the catalog and exit
    #[arg(long)]
    list_shows: bool,
}

impl Cli {
    fn config(&self) -> BrowserConfig {
        BrowserConfig {
            base_url: self.base_url.clone(),
            default_show: self.show,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    fn is_one_shot(&self) -> bool {
        self.search.is_some() || self.episode.is_some() || self.list_shows
    }
}

/// Prints episode cards to stdout and failures to stderr
struct TerminalRenderer;

impl EpisodeRenderer for TerminalRenderer {
    fn render(&mut self, episodes: &[&Episode], count: EpisodeCount) {
        println!();
        for episode in episodes {
            let card = EpisodeCard::from(*episode);
            println!("{} - {} ({})", card.code, card.title, card.runtime);
            println!("  {}", card.summary);
            if count.is_single() {
                println!("  Image: {}", card.image);
                if let Some(full_image) = &card.full_image {
                    println!("  Full size: {}", full_image);
                }
            }
            println!("  {}", card.link);
            println!();
        }
        println!("{}", count);
    }

    fn render_error(&mut self, error: &NetworkError) {
        eprintln!("\nError: Could not load data from the catalog: {}", error);
    }
}

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Search,
    JumpToEpisode,
    ShowAll,
    SwitchShow,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 5] = [
        MenuItem::Search,
        MenuItem::JumpToEpisode,
        MenuItem::ShowAll,
        MenuItem::SwitchShow,
        MenuItem::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::Search => "Search episodes",
            MenuItem::JumpToEpisode => "Jump to episode",
            MenuItem::ShowAll => "Show all episodes",
            MenuItem::SwitchShow => "Switch show",
            MenuItem::Quit => "Quit",
        }
    }
}

/// Returns the display name of the active show, if the show index is loaded
fn active_show_name<P: CatalogProvider>(browser: &Browser<P>) -> String {
    let active = browser.active_show();
    browser
        .cache()
        .cached_shows()
        .and_then(|shows| shows.iter().find(|show| show.id == active))
        .map_or_else(|| format!("Show #{}", active), |show| show.name.clone())
}

fn run_interactive<P: CatalogProvider>(
    browser: &mut Browser<P>,
    renderer: &mut TerminalRenderer,
) -> Result<(), dialoguer::Error> {
    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();

    loop {
        let choice = Select::new()
            .with_prompt(format!(
                "{} ({})",
                active_show_name(browser),
                browser.episode_count()
            ))
            .items(&labels)
            .default(0)
            .interact()?;

        match MenuItem::ALL[choice] {
            MenuItem::Search => {
                let term: String = Input::new()
                    .with_prompt("Search term (blank shows all)")
                    .allow_empty(true)
                    .with_initial_text(browser.search_term())
                    .interact_text()?;
                browser.set_search_term(term.trim());
            }
            MenuItem::JumpToEpisode => {
                let options = browser.episode_options();
                let mut items = vec!["All episodes".to_string()];
                items.extend(options.iter().map(|(_, label)| label.clone()));

                let picked = FuzzySelect::new()
                    .with_prompt("Episode")
                    .items(&items)
                    .default(0)
                    .interact()?;

                match picked.checked_sub(1).and_then(|index| options.get(index)) {
                    Some((key, _)) => {
                        browser.select_episode(key.season, key.number);
                    }
                    None => browser.clear_episode_selection(),
                }
            }
            MenuItem::ShowAll => browser.clear_episode_selection(),
            MenuItem::SwitchShow => {
                let shows: Vec<(ShowId, String)> = match browser.shows() {
                    Ok(shows) => shows.iter().map(|s| (s.id, s.name.clone())).collect(),
                    Err(e) => {
                        renderer.render_error(&e);
                        continue;
                    }
                };
                let names: Vec<&str> = shows.iter().map(|(_, name)| name.as_str()).collect();
                let current = shows
                    .iter()
                    .position(|(id, _)| *id == browser.active_show())
                    .unwrap_or(0);

                let picked = FuzzySelect::new()
                    .with_prompt("Show")
                    .items(&names)
                    .default(current)
                    .interact()?;

                if let Err(e) = browser.set_show(shows[picked].0) {
                    renderer.render_error(&e);
                    continue;
                }
            }
            MenuItem::Quit => return Ok(()),
        }

        browser.render(renderer);
    }
}

fn run_one_shot<P: CatalogProvider>(
    cli: &Cli,
    browser: &mut Browser<P>,
    renderer: &mut TerminalRenderer,
) -> Result<(), String> {
    if cli.list_shows {
        let shows = browser.shows().map_err(|e| e.to_string())?;
        for show in shows {
            println!("{:>6}  {}", show.id.0, show.name);
        }
        return Ok(());
    }

    if let Some(key) = cli.episode {
        if !browser.select_episode(key.season, key.number) {
            return Err(format!("Episode {} not found in show {}", key, browser.active_show()));
        }
    }

    if let Some(term) = &cli.search {
        browser.set_search_term(term);
    }

    browser.render(renderer);
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_env("EPISODE_BROWSER_LOG")
        .unwrap_or_else(|_| EnvFilter::new("episode_browser=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = cli.config();
    let mut renderer = TerminalRenderer;

    let mut browser = match open_browser(&config) {
        Ok(browser) => browser,
        Err(e) => {
            eprintln!("Error: Could not create catalog client: {}", e);
            process::exit(1);
        }
    };

    // The show index is only needed to list shows
    if !cli.list_shows {
        if let Err(e) = browser.set_show(config.default_show) {
            renderer.render_error(&e);
            process::exit(1);
        }
    }

    if cli.is_one_shot() {
        if let Err(e) = run_one_shot(&cli, &mut browser, &mut renderer) {
            eprintln!("\nError: {}", e);
            process::exit(1);
        }
        return;
    }

    browser.render(&mut renderer);

    if let Err(e) = run_interactive(&mut browser, &mut renderer) {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
