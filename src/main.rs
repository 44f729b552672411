use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use folio::build::build_site;
use folio::config::{define_config, Config};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let project = Arg::with_name("PROJECT")
        .help("Directory containing folio.yaml (or any of its subdirectories)")
        .index(1);

    let matches = App::new("folio")
        .version(crate_version!())
        .about("Indexes markdown posts and builds a priority-ranked sitemap")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Writes the post index and the sitemap")
                .arg(project.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("Overrides the project's output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("posts")
                .about("Prints the post index as YAML")
                .arg(project)
                .arg(
                    Arg::with_name("all")
                        .long("all")
                        .help("Includes every document, not only those with `template: post`"),
                ),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("error: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("build", Some(matches)) => {
            let mut config = load_config(matches)?;
            if let Some(output) = matches.value_of("output") {
                config.output_directory = PathBuf::from(output);
            }
            build_site(config)?;
        }
        ("posts", Some(matches)) => {
            let mut config = load_config(matches)?;
            if matches.is_present("all") {
                config.only_post = false;
            }
            let config = define_config(config)?;
            serde_yaml::to_writer(std::io::stdout(), &config.theme.all_posts)?;
            println!();
        }
        _ => unreachable!("clap requires a subcommand"),
    }
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    let dir = matches.value_of("PROJECT").unwrap_or(".");
    Ok(Config::from_directory(&Path::new(dir).canonicalize()?)?)
}
