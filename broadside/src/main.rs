use std::{
    error::Error,
    fmt, fs,
    io::{self, BufRead, Write},
    path::Path,
};

use clap::{App, Arg, ArgMatches};
use enumflags2::BitFlags;
use log::{debug, info};
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, SeedableRng};
use regex::{Captures, Regex};
use serde::Deserialize;

use ghostfleet::{
    board::{BoardSize, Coordinate, Orientation, Outcome},
    game::{
        EventStep, Match, MatchConfig, MatchSetup, Order, OrderOutcome, Phase, PlayerId,
        PlayerKind, Rule,
    },
    ships::{Mode, ShipCatalog, ShipId, ShipKind},
};

/// Ship catalog as stored in a JSON file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    /// Name of the fleet, only used for display.
    name: String,
    ships: Vec<ShipKind>,
}

fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let matches = App::new("Broadside")
        .version("1.0")
        .author("Zachary Stewart <zachary@zstewart.com>")
        .about("Hot-seat naval combat for any number of humans and bots.")
        .arg(
            Arg::with_name("humans")
                .short("p")
                .long("humans")
                .value_name("COUNT")
                .help("number of human players")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::with_name("bots")
                .short("b")
                .long("bots")
                .value_name("COUNT")
                .help("number of automated players")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::with_name("rows")
                .long("rows")
                .value_name("ROWS")
                .help("rows of every board, at least 7")
                .takes_value(true)
                .default_value("7"),
        )
        .arg(
            Arg::with_name("cols")
                .long("cols")
                .value_name("COLS")
                .help("columns of every board, at least 7")
                .takes_value(true)
                .default_value("7"),
        )
        .arg(
            Arg::with_name("abilities")
                .short("a")
                .long("abilities")
                .help("allow ships to use their special abilities"),
        )
        .arg(
            Arg::with_name("in_order")
                .long("in-order")
                .help("let the first player move first instead of a random one"),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("SEED")
                .help("seed for every random choice of the match")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("ships")
                .long("ships")
                .value_name("FILE")
                .help("JSON file with the ships to play with")
                .takes_value(true),
        )
        .get_matches();

    let humans: u32 = parse_arg(&matches, "humans")?;
    let bots: u32 = parse_arg(&matches, "bots")?;
    let players = humans
        .checked_add(bots)
        .ok_or("too many players for one match")?;
    if players < 2 {
        return Err("a match needs at least two players".into());
    }
    let config = build_config(&matches)?;
    let catalog = match matches.value_of("ships") {
        Some(path) => load_catalog(Path::new(path))?,
        None => ShipCatalog::standard(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut setup = MatchSetup::new(config, catalog)?;
    for id in 1..=humans {
        setup.add_player(PlayerId(id), PlayerKind::Human)?;
    }
    for id in (1..=players).skip(humans as usize) {
        setup.add_player(PlayerId(id), PlayerKind::automated())?;
    }

    let stdin = std::io::stdin();
    let mut input = InputReader::new(stdin.lock());
    for id in 1..=humans {
        choose_placements(&mut rng, &mut setup, PlayerId(id), &mut input)?;
    }

    let mut game = match setup.start() {
        Ok(game) => game,
        Err(_) => return Err("not every player finished deploying".into()),
    };
    info!("match started with {} players", players);
    play(&mut game, &mut input)?;
    if let Some(winner) = game.winner() {
        println!();
        println!("{} wins the match!", winner);
    }
    Ok(())
}

/// Parse the value of a clap argument that has a default.
fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<T, Box<dyn Error>>
where
    T: std::str::FromStr,
    T::Err: Error + 'static,
{
    let raw = matches.value_of(name).unwrap_or_default();
    raw.parse()
        .map_err(|err| format!("invalid {} {:?}: {}", name, raw, err).into())
}

fn build_config(matches: &ArgMatches) -> Result<MatchConfig, Box<dyn Error>> {
    let board = BoardSize::try_new(parse_arg(matches, "rows")?, parse_arg(matches, "cols")?)
        .ok_or("the board must have at least one row and column")?;
    let mut rules: BitFlags<Rule> = BitFlags::empty();
    if matches.is_present("abilities") {
        rules.insert(Rule::Abilities);
    }
    if !matches.is_present("in_order") {
        rules.insert(Rule::RandomFirstTurn);
    }
    let mut config = MatchConfig::default().with_board(board).with_rules(rules);
    if matches.is_present("seed") {
        config = config.with_seed(parse_arg(matches, "seed")?);
    }
    Ok(config)
}

/// Read a ship catalog from a JSON file and check it.
fn load_catalog(path: &Path) -> Result<ShipCatalog, Box<dyn Error>> {
    let file: CatalogFile = serde_json::from_str(&fs::read_to_string(path)?)?;
    let catalog = ShipCatalog::new(file.ships)?;
    debug!("loaded {} ships from {}", catalog.len(), path.display());
    println!("Playing with the {} fleet.", file.name);
    Ok(catalog)
}

/// Matcher for coordinates written as `row,col` or `row col`.
const COORD: &str = r"(?P<row>-?[0-9]+)(?:\s*,\s*|\s+)(?P<col>-?[0-9]+)";

/// Choose placements for all ships of `player` using their input.
fn choose_placements(
    rng: &mut StdRng,
    setup: &mut MatchSetup,
    player: PlayerId,
    input: &mut InputReader<impl BufRead>,
) -> io::Result<()> {
    enum Command {
        Done,
        Place(ShipId, Coordinate, Orientation),
        Undo,
        Redo,
        RandomizeRest,
        Help,
    }
    static PLACE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(
            r"^(?x)(?:place|put)\s+
            (?P<ship>[a-z0-9][a-z0-9\x20]*?)\s+
            (?:(?:at|on|to)\s+)?
            {}\s+
            (?P<dir>\w+)$",
            COORD
        ))
        .unwrap()
    });

    println!();
    println!("{}, place your ships. Type help or ? for commands.", player);
    loop {
        println!();
        let pending = setup.pending_ships(player).unwrap_or_default();
        if pending.is_empty() {
            println!("All ships placed, type done to start the game.");
        } else {
            let names: Vec<_> = pending
                .iter()
                .filter_map(|&ship| setup.catalog().get(ship))
                .map(|kind| format!("{} ({})", kind.name(), kind.len()))
                .collect();
            println!("Remaining ships to place: {}", names.join(", "));
        }
        println!("Your current board setup:");
        show_setup_board(setup, player);
        println!();

        let catalog = setup.catalog();
        let cmd = input.read_input_lower("> ", |line| match line {
            "?" | "help" | "h" => Some(Command::Help),
            "randomize" | "rand" | "random" => Some(Command::RandomizeRest),
            "done" | "start" => Some(Command::Done),
            "undo" | "u" => Some(Command::Undo),
            "redo" | "r" => Some(Command::Redo),
            other => match PLACE.captures(other) {
                Some(captures) => {
                    let ship = parse_ship(catalog, &captures["ship"])?;
                    let anchor = parse_coordinate(&captures)?;
                    let dir = parse_orientation(&captures["dir"])?;
                    Some(Command::Place(ship, anchor, dir))
                }
                None => {
                    println!("Invalid placement command \"{}\". Use '?' for help", other);
                    None
                }
            },
        })?;

        match cmd {
            Command::Done => match setup.finish(player) {
                Ok(_) => break,
                Err(err) => println!("Cannot start yet: {}.", err),
            },
            Command::Place(ship, anchor, dir) => {
                if let Err(err) = setup.place(player, ship, anchor, dir) {
                    println!("Invalid placement: {}.", err);
                }
            }
            Command::Undo => match setup.undo(player) {
                Ok(ship) => println!("Removed the {}.", ship_name(setup.catalog(), ship)),
                Err(err) => println!("{}.", err),
            },
            Command::Redo => match setup.redo(player) {
                Ok(ship) => println!("Restored the {}.", ship_name(setup.catalog(), ship)),
                Err(err) => println!("{}.", err),
            },
            Command::RandomizeRest => {
                if let Err(err) = setup.place_remaining_randomly(player, rng) {
                    println!("Could not place the remaining ships: {}.", err);
                }
            }
            Command::Help => {
                println!(
                    "Available Commands:
    done                          finish deploying and wait for the match to start.
    place <ship> <row>,<col> <dir>  place the ship with its first cell at the coordinate,
        extending in the direction. Directions are \"north\", \"south\", \"east\" and
        \"west\". Ships are given by name or by number.
    undo                          remove the most recently placed ship.
    redo                          put back the most recently removed ship.
    randomize                     place the remaining ships at random."
                );
                show_catalog(setup.catalog());
            }
        }
    }
    Ok(())
}

/// Run the match until it ends, asking the human holding the turn for orders.
fn play(game: &mut Match, input: &mut InputReader<impl BufRead>) -> io::Result<()> {
    enum Command {
        Order(Order),
        End,
        Quit,
        Status,
        Help,
    }
    static STRIKE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(&format!(
            r"^(?x)(?P<mode>attack|scout|a|s)\s+
            (?:(?P<ship>[a-z][a-z\x20]*?)\s+)?
            (?:(?:at|on)\s+)?
            {}
            (?:\s+(?P<dir>\w+))?$",
            COORD
        ))
        .unwrap()
    });

    report_events(game);
    while let Phase::ActivePlayerTurn(player) = game.phase() {
        println!();
        show_turn(game, player);

        let catalog = game.catalog();
        let cmd = input.read_input_lower("> ", |line| match line {
            "?" | "help" | "h" => Some(Command::Help),
            "end" | "done" | "pass" => Some(Command::End),
            "quit" | "surrender" => Some(Command::Quit),
            "status" | "points" => Some(Command::Status),
            other => match STRIKE.captures(other) {
                Some(captures) => {
                    let mode = match &captures["mode"] {
                        "attack" | "a" => Mode::Attack,
                        _ => Mode::Scout,
                    };
                    let anchor = parse_coordinate(&captures)?;
                    let orientation = match captures.name("dir") {
                        Some(dir) => parse_orientation(dir.as_str())?,
                        None => Orientation::North,
                    };
                    let order = match captures.name("ship") {
                        Some(ship) => Order::ability(
                            mode,
                            parse_ship(catalog, ship.as_str())?,
                            anchor,
                            orientation,
                        ),
                        None => Order::strike(mode, anchor),
                    };
                    Some(Command::Order(order))
                }
                None => {
                    println!("Invalid command \"{}\". Use '?' for help", other);
                    None
                }
            },
        })?;

        match cmd {
            Command::Order(order) => match game.issue(player, order) {
                Ok(OrderOutcome::Resolved(cells)) => {
                    for (coord, outcome) in cells {
                        println!("  {}: {}", coord, OutcomeText(outcome));
                    }
                }
                Ok(OrderOutcome::Deferred) => {
                    println!("Launched. It will move at the start of your next turns.")
                }
                Ok(OrderOutcome::Accumulating { selected, required }) => {
                    println!("Selected {} of {} targets.", selected, required)
                }
                Err(err) => println!("Order rejected: {}.", err),
            },
            Command::End => {
                if let Err(err) = game.advance_turn(player) {
                    println!("{}.", err);
                }
                report_events(game);
            }
            Command::Quit => {
                if let Err(err) = game.quit(player) {
                    println!("{}.", err);
                }
                report_events(game);
            }
            Command::Status => show_status(game),
            Command::Help => {
                println!(
                    "Available Commands:
    attack <row>,<col>                   free single-cell attack, once per turn.
    scout <row>,<col>                    free single-cell scout, once per turn.
    attack <ship> <row>,<col> [<dir>]    use the attack ability of one of your ships.
    scout <ship> <row>,<col> [<dir>]     use the scout ability of one of your ships.
    end                                  end your turn.
    status                               show every player's points and target.
    quit                                 leave the match."
                );
                show_catalog(game.catalog());
            }
        }
    }
    Ok(())
}

/// Look up a ship by name or catalog number.
fn parse_ship(catalog: &ShipCatalog, name: &str) -> Option<ShipId> {
    let found = match name.parse::<usize>() {
        Ok(index) => Some(ShipId(index)).filter(|&id| catalog.get(id).is_some()),
        Err(_) => catalog.find(name),
    };
    if found.is_none() {
        println!("Unknown ship \"{}\". Use '?' to list the ships.", name);
    }
    found
}

fn parse_coordinate(captures: &Captures) -> Option<Coordinate> {
    match (captures["row"].parse(), captures["col"].parse()) {
        (Ok(row), Ok(col)) => Some(Coordinate::new(row, col)),
        _ => {
            println!("Coordinates must be numbers.");
            None
        }
    }
}

fn parse_orientation(dir: &str) -> Option<Orientation> {
    match dir {
        "up" | "north" | "u" | "n" => Some(Orientation::North),
        "down" | "south" | "d" | "s" => Some(Orientation::South),
        "left" | "west" | "l" | "w" => Some(Orientation::West),
        "right" | "east" | "r" | "e" => Some(Orientation::East),
        other => {
            println!(
                "invalid direction {}, choose \"north\", \"south\", \"east\", or \"west\"",
                other
            );
            None
        }
    }
}

fn ship_name(catalog: &ShipCatalog, ship: ShipId) -> &str {
    catalog.get(ship).map_or("unknown ship", |kind| kind.name())
}

/// Print the ships of the catalog with their abilities.
fn show_catalog(catalog: &ShipCatalog) {
    println!();
    println!("Available Ships:");
    for (id, kind) in catalog.iter() {
        println!(
            "    {} \"{}\" ({}) length {}, attack {} for {:?}, scout {} for {:?}",
            id.0,
            kind.name().to_lowercase(),
            ShipAbbreviation(kind.name()),
            kind.len(),
            kind.cost(Mode::Attack),
            kind.shape(Mode::Attack),
            kind.cost(Mode::Scout),
            kind.shape(Mode::Scout),
        );
    }
}

/// Print everything the player holding the turn may see.
fn show_turn(game: &Match, player: PlayerId) {
    let target = match game.target_of(player) {
        Some(target) => target,
        None => return,
    };
    println!("=== {}'s turn, hunting {} ===", player, target);
    if let Some(points) = game.points_of(player) {
        println!("Points: {}", points);
    }
    if !game.strike_available(player) {
        println!("Free strike used this turn.");
    }
    if let Some(selection) = game.pending_selection(player) {
        println!(
            "Selecting targets for the {} {} ability: {} chosen.",
            ship_name(game.catalog(), selection.ship()),
            selection.mode(),
            selection.anchors().len()
        );
    }
    for event in game.events_of(player) {
        println!(
            "In flight: {} heading {} from {}, {} cells to go.",
            event.kind(),
            event.orientation(),
            event.last().unwrap_or_else(|| event.anchor()),
            event.remaining()
        );
    }
    println!();
    println!("Your fleet:");
    show_fleet_board(game, player);
    println!();
    println!("What you know about {}:", target);
    show_target_board(game, player, target);
}

fn show_status(game: &Match) {
    for player in game.players() {
        let standing = match game.standing(player) {
            Some(standing) => standing,
            None => continue,
        };
        let points = game
            .points_of(player)
            .map_or_else(String::new, |points| points.to_string());
        let target = game
            .target_of(player)
            .map_or_else(|| "nobody".to_string(), |target| target.to_string());
        println!("{}: {:?}, {}, hunting {}", player, standing, points, target);
    }
}

/// Print the event steps resolved since the last report.
fn report_events(game: &mut Match) {
    for EventStep {
        owner,
        kind,
        position,
        outcome,
    } in game.take_event_steps()
    {
        println!(
            "{}'s {} event reached {}: {}",
            owner,
            kind,
            position,
            OutcomeText(outcome)
        );
    }
}

/// Print the board of the given player during deployment.
fn show_setup_board(setup: &MatchSetup, player: PlayerId) {
    let catalog = setup.catalog();
    let placement = match setup.placement_of(player) {
        Some(placement) => placement,
        None => return,
    };
    show_board(setup.config().board, |coord| match placement.get(coord) {
        Some(ship) => ShipAbbreviation(ship_name(catalog, ship)).to_string(),
        None => "~~".to_string(),
    })
}

/// Print the remaining ship cells of the given player.
fn show_fleet_board(game: &Match, player: PlayerId) {
    let catalog = game.catalog();
    let placement = match game.placement_of(player) {
        Some(placement) => placement,
        None => return,
    };
    show_board(game.board(), |coord| match placement.get(coord) {
        Some(ship) => ShipAbbreviation(ship_name(catalog, ship)).to_string(),
        None => "~~".to_string(),
    })
}

/// Print what `observer` recorded against `target`.
fn show_target_board(game: &Match, observer: PlayerId, target: PlayerId) {
    let history = game.hit_history(observer, target);
    show_board(game.board(), |coord| {
        match history.and_then(|history| history.get(coord)) {
            None => "~~".to_string(),
            Some(outcome) => OutcomeText(outcome).symbol().to_string(),
        }
    })
}

/// Show the board by printing the grid, using `cell` to render every coordinate.
fn show_board<D: fmt::Display>(board: BoardSize, cell: impl Fn(Coordinate) -> D) {
    print!("   ");
    for col in 0..board.cols() {
        print!("{:^4}", col);
    }
    println!();
    for (row, coords) in board.iter_rows().enumerate() {
        print!("{:>2} ", row);
        for coord in coords {
            print!("{:^4}", cell(coord));
        }
        println!();
    }
}

/// Display helper for what a strike found.
struct OutcomeText(Outcome);

impl OutcomeText {
    fn symbol(&self) -> &'static str {
        match self.0 {
            Outcome::Miss => "x",
            Outcome::Hit => "X",
            Outcome::Spotted => "?",
        }
    }
}

impl fmt::Display for OutcomeText {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self.0 {
            Outcome::Miss => "miss",
            Outcome::Hit => "hit!",
            Outcome::Spotted => "ship spotted",
        })
    }
}

/// Display helper that prints a two letter abbreviation of a ship name.
struct ShipAbbreviation<'a>(&'a str);

impl fmt::Display for ShipAbbreviation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let words: Vec<_> = self.0.split_whitespace().collect();
        let abbrev: String = if words.len() > 1 {
            words.iter().filter_map(|word| word.chars().next()).take(2).collect()
        } else {
            self.0.chars().take(2).collect()
        };
        f.pad(&abbrev.to_lowercase())
    }
}

/// Helper to read input from the player.
struct InputReader<B> {
    read: B,
    buf: String,
}

impl<B> InputReader<B> {
    fn new(read: B) -> Self {
        Self {
            read,
            buf: String::new(),
        }
    }
}

impl<B: BufRead> InputReader<B> {
    /// Repeatedly tries to read input until the input checker returns `Some`. Converts
    /// to ascii lower before running the checker.
    fn read_input_lower<F, T>(&mut self, prompt: &str, mut checker: F) -> io::Result<T>
    where
        F: FnMut(&str) -> Option<T>,
    {
        loop {
            self.read_line(prompt)?;
            self.buf.make_ascii_lowercase();
            if let Some(val) = checker(self.buf.trim()) {
                return Ok(val);
            }
        }
    }

    /// Print the prompt, clear the string buffer and read a line. Exits on end of input.
    fn read_line(&mut self, prompt: &str) -> io::Result<()> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        self.buf.clear();
        if self.read.read_line(&mut self.buf)? == 0 {
            println!();
            std::process::exit(0);
        }
        Ok(())
    }
}
