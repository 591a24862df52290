use {
    crate::{
        cart::Session,
        inventory::{InventoryError, Store},
        item::ItemPatch,
        logger,
    },
    clap::{Args, Parser, Subcommand},
    colored::Colorize,
    log::{debug, LevelFilter},
    std::{
        error::Error,
        fmt::{self, Display, Formatter},
        io::{stdin, stdout, BufRead, Write},
        path::PathBuf,
        str::FromStr,
    },
    ErrorMessage::*,
};

#[derive(Parser, Debug)]
#[command(version, about = "Funko Pop inventory and shopping cart")]
pub struct Cli {
    /// Inventory file to read and write
    #[arg(long, short, global = true)]
    file: Option<PathBuf>,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[clap(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Add(AddArgs),
    List,
    View(IdArgs),
    Delete(IdArgs),
    Update(UpdateArgs),
    Cart(CartCommands),
}

#[derive(Debug, Args)]
struct IdArgs {
    #[arg(allow_negative_numbers = true)]
    id: i64,
}

#[derive(Debug, Default, Args)]
struct AddArgs {
    name: Option<String>,
    #[arg(allow_negative_numbers = true)]
    price_in_cents: Option<i64>,
    #[arg(long)]
    in_stock: Option<bool>,
    #[arg(long, short)]
    series: Option<String>,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(allow_negative_numbers = true)]
    id: i64,
    #[arg(long, short)]
    name: Option<String>,
    #[arg(long, short, allow_negative_numbers = true)]
    price: Option<i64>,
    #[arg(long)]
    in_stock: Option<bool>,
    #[arg(long, short)]
    series: Option<String>,
}

#[derive(Debug, Args)]
struct CartCommands {
    #[clap(subcommand)]
    cmd: CartSubcommands,
}

#[derive(Debug, Subcommand)]
enum CartSubcommands {
    Add(IdArgs),
    View,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddItem,
    ListItems,
    ViewItem,
    UpdateItem,
    DeleteItem,
    AddToCart,
    ViewCart,
    CancelCart,
    Exit,
}

/// Menu entries in display order; entry `n` is chosen by typing `n + 1`.
pub const MENU: [(MenuChoice, &str); 9] = [
    (MenuChoice::AddItem, "Add a Funko Pop"),
    (MenuChoice::ListItems, "List all Funko Pops"),
    (MenuChoice::ViewItem, "View a Funko Pop"),
    (MenuChoice::UpdateItem, "Update a Funko Pop"),
    (MenuChoice::DeleteItem, "Delete a Funko Pop"),
    (MenuChoice::AddToCart, "Add a Funko Pop to the cart"),
    (MenuChoice::ViewCart, "View the cart"),
    (MenuChoice::CancelCart, "Cancel the cart"),
    (MenuChoice::Exit, "Exit"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    InvalidCommand,
    InvalidNumber,
    InvalidChoice,
    InvalidAnswer,
    EmptyValue,
    EndOfInput,
}

impl ErrorMessage {
    pub(crate) fn as_str(&self) -> &'static str {
        match *self {
            InvalidCommand => "Invalid command",
            InvalidNumber => "Invalid number",
            InvalidChoice => "Invalid choice, pick a number from 1 to 9",
            InvalidAnswer => "Please answer y or n",
            EmptyValue => "A value is required",
            EndOfInput => "No more input",
        }
    }
}

impl Display for ErrorMessage {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug)]
pub struct ReplError {
    pub kind: ErrorMessage,
}

impl Display for ReplError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for ReplError {}

impl ReplError {
    pub fn base(kind: ErrorMessage) -> Box<dyn Error> {
        Box::new(ReplError { kind })
    }

    pub fn is(error: &(dyn Error + 'static), kind: ErrorMessage) -> bool {
        matches!(error.downcast_ref::<ReplError>(), Some(e) if e.kind == kind)
    }
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        logger::level_for(self.verbose, self.quiet)
    }
}

impl FromStr for MenuChoice {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<usize>() {
            Ok(number @ 1..=9) => Ok(MENU[number - 1].0),
            _ => Err(ReplError::base(InvalidChoice)),
        }
    }
}

pub struct Parsing;

impl Parsing {
    pub fn yes_no(answer: &str) -> Option<bool> {
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        }
    }

    pub fn number(input: &str) -> Result<i64, Box<dyn Error>> {
        input
            .trim()
            .parse::<i64>()
            .map_err(|_| ReplError::base(InvalidNumber))
    }

    pub fn optional_number(input: &str) -> Result<Option<i64>, Box<dyn Error>> {
        if input.trim().is_empty() {
            Ok(None)
        } else {
            Parsing::number(input).map(Some)
        }
    }

    pub fn optional_text(input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Line-oriented questions over any buffered reader (stdin in normal use).
pub struct Prompt<R: BufRead> {
    input: R,
}

impl<R: BufRead> Prompt<R> {
    pub fn new(input: R) -> Self {
        Prompt { input }
    }

    /// Next trimmed line, or `None` once the input is exhausted.
    pub fn read(&mut self) -> Result<Option<String>, Box<dyn Error>> {
        let mut buffer = String::new();
        match self.input.read_line(&mut buffer)? {
            0 => Ok(None),
            _ => Ok(Some(buffer.trim().to_string())),
        }
    }

    pub fn ask(&mut self, question: &str) -> Result<String, Box<dyn Error>> {
        print!("{} ", question);
        stdout().flush()?;
        self.read()?.ok_or_else(|| ReplError::base(EndOfInput))
    }

    pub fn number(&mut self, question: &str) -> Result<i64, Box<dyn Error>> {
        Parsing::number(&self.ask(question)?)
    }

    /// Asks until the answer is y/n. An empty answer is `None` when `keep_on_empty` is set.
    pub fn yes_no(
        &mut self,
        question: &str,
        keep_on_empty: bool,
    ) -> Result<Option<bool>, Box<dyn Error>> {
        loop {
            let answer = self.ask(&format!("{} [y/n]:", question))?;
            if keep_on_empty && answer.is_empty() {
                return Ok(None);
            }
            match Parsing::yes_no(&answer) {
                Some(answer) => return Ok(Some(answer)),
                None => println!("{}", InvalidAnswer.as_str().yellow()),
            }
        }
    }

    fn id(&mut self) -> Result<i64, Box<dyn Error>> {
        self.number("Enter the ID of the Funko Pop:")
    }

    fn patch_for(&mut self, session: &Session, id: i64) -> Result<ItemPatch, Box<dyn Error>> {
        let item = session.store.view(id)?;
        let name = self.ask(&format!("Enter new name ({}):", item.name))?;
        let price = self.ask(&format!("Enter new price ({}):", item.price_in_cents))?;
        let in_stock = self.yes_no(
            &format!("Is the Funko Pop in stock? ({})", item.in_stock),
            true,
        )?;
        let series = self.ask(&format!("Enter new series ({}):", item.series))?;
        Ok(ItemPatch {
            name: Parsing::optional_text(&name),
            price_in_cents: Parsing::optional_number(&price)?,
            in_stock,
            series: Parsing::optional_text(&series),
        })
    }
}

fn add_item<R: BufRead>(
    args: AddArgs,
    session: &mut Session,
    prompt: &mut Prompt<R>,
) -> Result<(), Box<dyn Error>> {
    let name = match args.name {
        Some(name) => name,
        None => Parsing::optional_text(&prompt.ask("Enter Funko Pop name:")?)
            .ok_or_else(|| ReplError::base(EmptyValue))?,
    };
    let price_in_cents = match args.price_in_cents {
        Some(price) => price,
        None => prompt.number("Enter Funko Pop price (in cents):")?,
    };
    let in_stock = match args.in_stock {
        Some(in_stock) => in_stock,
        None => prompt.yes_no("Is the Funko Pop in stock?", false)? == Some(true),
    };
    let series = match args.series {
        Some(series) => series,
        None => prompt.ask("Enter the series:")?,
    };
    let item = session.store.add(&name, price_in_cents, in_stock, &series)?;
    println!("{}", format!("Funko Pop added successfully! (ID {})", item.id).green());
    Ok(())
}

fn update_item<R: BufRead>(
    args: UpdateArgs,
    session: &mut Session,
    prompt: &mut Prompt<R>,
) -> Result<(), Box<dyn Error>> {
    let mut patch = ItemPatch {
        name: args.name,
        price_in_cents: args.price,
        in_stock: args.in_stock,
        series: args.series,
    };
    if patch.is_empty() {
        patch = prompt.patch_for(session, args.id)?;
    }
    session.store.update(args.id, patch)?;
    println!("{}", "Funko Pop updated successfully!".green());
    Ok(())
}

fn view_cart(session: &Session) -> Result<(), Box<dyn Error>> {
    let mut lines = session.cart.report()?;
    let last = lines.pop().unwrap_or_default();
    lines.iter().for_each(|line| println!("{}", line));
    if session.cart.is_empty() {
        println!("{}", last.yellow());
    } else {
        println!("{}", last.green());
    }
    Ok(())
}

fn resolve_cmd<R: BufRead>(
    cmd: Commands,
    session: &mut Session,
    prompt: &mut Prompt<R>,
) -> Result<(), Box<dyn Error>> {
    use Commands::*;
    match cmd {
        Add(args) => add_item(args, session, prompt),
        List => {
            session.store.list().for_each(|line| println!("{}", line));
            Ok(())
        }
        View(IdArgs { id }) => {
            let item = session.store.view(id)?;
            println!("{}", serde_json::to_string_pretty(&item)?);
            Ok(())
        }
        Delete(IdArgs { id }) => {
            session.store.delete(id)?;
            println!("{}", "Funko Pop deleted successfully!".green());
            Ok(())
        }
        Update(args) => update_item(args, session, prompt),
        Cart(cart) => match cart.cmd {
            CartSubcommands::Add(IdArgs { id }) => {
                session.add_to_cart(id)?;
                println!("{}", "Funko Pop added to cart!".green());
                Ok(())
            }
            CartSubcommands::View => view_cart(session),
            CartSubcommands::Cancel => {
                session.cart.cancel();
                println!("{}", "Cart emptied successfully!".green());
                Ok(())
            }
        },
    }
}

/// Runs a command, reporting inventory failures (not found, unreadable or unwritable
/// store, oversized totals) to the user instead of failing the whole run.
fn respond<R: BufRead>(
    cmd: Commands,
    session: &mut Session,
    prompt: &mut Prompt<R>,
) -> Result<(), Box<dyn Error>> {
    match resolve_cmd(cmd, session, prompt) {
        Err(e) if InventoryError::is_not_found(&*e) => {
            println!("{}", e.to_string().red());
            Ok(())
        }
        Err(e) if e.is::<InventoryError>() => {
            println!("{}", e.to_string().red().bold());
            Ok(())
        }
        other => other,
    }
}

fn menu_command<R: BufRead>(
    choice: MenuChoice,
    prompt: &mut Prompt<R>,
) -> Result<Option<Commands>, Box<dyn Error>> {
    use MenuChoice::*;
    let cmd = match choice {
        AddItem => Commands::Add(AddArgs::default()),
        ListItems => Commands::List,
        ViewItem => Commands::View(IdArgs { id: prompt.id()? }),
        UpdateItem => Commands::Update(UpdateArgs {
            id: prompt.id()?,
            name: None,
            price: None,
            in_stock: None,
            series: None,
        }),
        DeleteItem => Commands::Delete(IdArgs { id: prompt.id()? }),
        AddToCart => Commands::Cart(CartCommands {
            cmd: CartSubcommands::Add(IdArgs { id: prompt.id()? }),
        }),
        ViewCart => Commands::Cart(CartCommands { cmd: CartSubcommands::View }),
        CancelCart => Commands::Cart(CartCommands { cmd: CartSubcommands::Cancel }),
        Exit => return Ok(None),
    };
    Ok(Some(cmd))
}

/// Interactive loop over the numbered menu. Returns on `Exit` or when input runs out;
/// errors from a single choice are printed and the loop goes on.
pub fn run_menu<R: BufRead>(
    session: &mut Session,
    prompt: &mut Prompt<R>,
) -> Result<(), Box<dyn Error>> {
    loop {
        println!();
        for (number, (_, label)) in MENU.iter().enumerate() {
            println!("{}. {}", number + 1, label);
        }
        print!("> ");
        stdout().flush()?;
        let choice = match prompt.read()? {
            Some(line) => line.parse::<MenuChoice>(),
            None => break,
        };
        debug!("Menu choice {:?}", choice.as_ref().ok());
        let outcome = match choice.and_then(|choice| menu_command(choice, prompt)) {
            Ok(Some(cmd)) => respond(cmd, session, prompt),
            Ok(None) => break,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(_) => continue,
            Err(e) if ReplError::is(&*e, EndOfInput) => break,
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
    println!("Goodbye!");
    Ok(())
}

pub fn invalid_command(error: &clap::Error) {
    println!("{}", InvalidCommand.as_str().red());
    eprintln!("{}", error);
}

pub fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut session = Session::new(Store::new(cli.file));
    debug!("Using inventory at {}", session.store.path().display());
    let mut prompt = Prompt::new(stdin().lock());
    match cli.cmd {
        Some(cmd) => respond(cmd, &mut session, &mut prompt),
        None => run_menu(&mut session, &mut prompt),
    }
}
