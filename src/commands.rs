use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use ulid::Ulid;

use crate::calendar::{self, Date};
use crate::engine::{Engine, EngineError};
use crate::model::*;
use crate::observability::*;

/// One front-desk instruction, parsed from a line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Register(NewGuest),
    Guest {
        guest_id: GuestId,
    },
    Rooms {
        available_only: bool,
        room_type: Option<RoomType>,
    },
    BookRoom {
        guest_id: GuestId,
        room_no: RoomNo,
        check_in: Date,
        check_out: Date,
    },
    ReleaseRoom {
        room_no: RoomNo,
    },
    Facilities,
    BookFacility {
        guest_id: GuestId,
        facility_id: FacilityId,
        day: Date,
    },
    ReleaseFacility {
        facility_id: FacilityId,
    },
    Park {
        guest_id: GuestId,
        vehicle: String,
    },
    Unpark {
        guest_id: GuestId,
    },
    Waitlist,
    DrainWaitlist,
    Booking {
        id: BookingId,
    },
    Bookings {
        guest_id: Option<GuestId>,
    },
    Advance {
        today: Option<Date>,
    },
    ReportIssue {
        room_no: RoomNo,
        kind: IssueKind,
        priority: Priority,
        description: String,
    },
    UpdateIssue {
        id: u32,
        status: MaintenanceStatus,
    },
    Issues,
    Menu,
    Order {
        room_no: RoomNo,
        choice: usize,
    },
    UpdateOrder {
        id: u32,
        status: ServiceStatus,
    },
    Orders,
    Bill {
        guest_id: GuestId,
        booking_id: BookingId,
    },
    Pay {
        bill_id: BillId,
        method: PaymentMethod,
    },
    Bills {
        guest_id: Option<GuestId>,
    },
    Report,
}

impl Command {
    /// Metric label.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Quit => "quit",
            Command::Register(_) => "register",
            Command::Guest { .. } => "guest",
            Command::Rooms { .. } => "rooms",
            Command::BookRoom { .. } => "book-room",
            Command::ReleaseRoom { .. } => "release-room",
            Command::Facilities => "facilities",
            Command::BookFacility { .. } => "book-facility",
            Command::ReleaseFacility { .. } => "release-facility",
            Command::Park { .. } => "park",
            Command::Unpark { .. } => "unpark",
            Command::Waitlist => "waitlist",
            Command::DrainWaitlist => "drain-waitlist",
            Command::Booking { .. } => "booking",
            Command::Bookings { .. } => "bookings",
            Command::Advance { .. } => "advance",
            Command::ReportIssue { .. } => "issue",
            Command::UpdateIssue { .. } => "issue-status",
            Command::Issues => "issues",
            Command::Menu => "menu",
            Command::Order { .. } => "order",
            Command::UpdateOrder { .. } => "order-status",
            Command::Orders => "orders",
            Command::Bill { .. } => "bill",
            Command::Pay { .. } => "pay",
            Command::Bills { .. } => "bills",
            Command::Report => "report",
        }
    }
}

/// A verb in the command table: its name, usage line, minimum argument count and parser.
pub struct Verb {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub min_args: usize,
    parse: fn(&[&str]) -> Result<Command, CommandError>,
}

pub const VERBS: &[Verb] = &[
    Verb {
        name: "help",
        aliases: &["?"],
        usage: "help",
        min_args: 0,
        parse: |_| Ok(Command::Help),
    },
    Verb {
        name: "register",
        aliases: &[],
        usage: "register <id> <name> [contact] [email] [preferences...]",
        min_args: 2,
        parse: |a| {
            Ok(Command::Register(NewGuest {
                id: a[0].to_string(),
                name: a[1].to_string(),
                contact: a.get(2).map_or_else(String::new, |s| s.to_string()),
                email: a.get(3).map_or_else(String::new, |s| s.to_string()),
                preferences: a.get(4..).map_or_else(String::new, |rest| rest.join(" ")),
            }))
        },
    },
    Verb {
        name: "guest",
        aliases: &[],
        usage: "guest <id>",
        min_args: 1,
        parse: |a| {
            Ok(Command::Guest {
                guest_id: a[0].to_string(),
            })
        },
    },
    Verb {
        name: "rooms",
        aliases: &[],
        usage: "rooms [available [standard|deluxe|suite]]",
        min_args: 0,
        parse: |a| match a.first() {
            None => Ok(Command::Rooms {
                available_only: false,
                room_type: None,
            }),
            Some(&"available") => Ok(Command::Rooms {
                available_only: true,
                room_type: a.get(1).map(|s| word(s)).transpose()?,
            }),
            Some(other) => Err(CommandError::Parse(format!("rooms: unknown filter {other}"))),
        },
    },
    Verb {
        name: "book-room",
        aliases: &[],
        usage: "book-room <guest> <room> <check-in> <check-out>",
        min_args: 4,
        parse: |a| {
            Ok(Command::BookRoom {
                guest_id: a[0].to_string(),
                room_no: number("room", a[1])?,
                check_in: date(a[2])?,
                check_out: date(a[3])?,
            })
        },
    },
    Verb {
        name: "release-room",
        aliases: &[],
        usage: "release-room <room>",
        min_args: 1,
        parse: |a| {
            Ok(Command::ReleaseRoom {
                room_no: number("room", a[0])?,
            })
        },
    },
    Verb {
        name: "facilities",
        aliases: &[],
        usage: "facilities",
        min_args: 0,
        parse: |_| Ok(Command::Facilities),
    },
    Verb {
        name: "book-facility",
        aliases: &[],
        usage: "book-facility <guest> <facility> <date>",
        min_args: 3,
        parse: |a| {
            Ok(Command::BookFacility {
                guest_id: a[0].to_string(),
                facility_id: number("facility", a[1])?,
                day: date(a[2])?,
            })
        },
    },
    Verb {
        name: "release-facility",
        aliases: &[],
        usage: "release-facility <facility>",
        min_args: 1,
        parse: |a| {
            Ok(Command::ReleaseFacility {
                facility_id: number("facility", a[0])?,
            })
        },
    },
    Verb {
        name: "park",
        aliases: &[],
        usage: "park <guest> <vehicle>",
        min_args: 2,
        parse: |a| {
            Ok(Command::Park {
                guest_id: a[0].to_string(),
                vehicle: a[1].to_string(),
            })
        },
    },
    Verb {
        name: "unpark",
        aliases: &[],
        usage: "unpark <guest>",
        min_args: 1,
        parse: |a| {
            Ok(Command::Unpark {
                guest_id: a[0].to_string(),
            })
        },
    },
    Verb {
        name: "waitlist",
        aliases: &[],
        usage: "waitlist",
        min_args: 0,
        parse: |_| Ok(Command::Waitlist),
    },
    Verb {
        name: "drain-waitlist",
        aliases: &[],
        usage: "drain-waitlist",
        min_args: 0,
        parse: |_| Ok(Command::DrainWaitlist),
    },
    Verb {
        name: "booking",
        aliases: &[],
        usage: "booking <booking-id>",
        min_args: 1,
        parse: |a| Ok(Command::Booking { id: ulid(a[0])? }),
    },
    Verb {
        name: "bookings",
        aliases: &[],
        usage: "bookings [guest]",
        min_args: 0,
        parse: |a| {
            Ok(Command::Bookings {
                guest_id: a.first().map(|s| s.to_string()),
            })
        },
    },
    Verb {
        name: "advance",
        aliases: &[],
        usage: "advance [date]",
        min_args: 0,
        parse: |a| {
            Ok(Command::Advance {
                today: a.first().map(|s| date(s)).transpose()?,
            })
        },
    },
    Verb {
        name: "issue",
        aliases: &[],
        usage: "issue <room> <electrical|plumbing|hvac|furniture|other> <low|medium|high> <description...>",
        min_args: 4,
        parse: |a| {
            Ok(Command::ReportIssue {
                room_no: number("room", a[0])?,
                kind: word(a[1])?,
                priority: word(a[2])?,
                description: a[3..].join(" "),
            })
        },
    },
    Verb {
        name: "issue-status",
        aliases: &[],
        usage: "issue-status <id> <in-progress|resolved>",
        min_args: 2,
        parse: |a| {
            Ok(Command::UpdateIssue {
                id: number("request", a[0])?,
                status: word(a[1])?,
            })
        },
    },
    Verb {
        name: "issues",
        aliases: &[],
        usage: "issues",
        min_args: 0,
        parse: |_| Ok(Command::Issues),
    },
    Verb {
        name: "menu",
        aliases: &[],
        usage: "menu",
        min_args: 0,
        parse: |_| Ok(Command::Menu),
    },
    Verb {
        name: "order",
        aliases: &[],
        usage: "order <room> <menu-item>",
        min_args: 2,
        parse: |a| {
            Ok(Command::Order {
                room_no: number("room", a[0])?,
                choice: number("menu item", a[1])?,
            })
        },
    },
    Verb {
        name: "order-status",
        aliases: &[],
        usage: "order-status <id> <in-progress|completed>",
        min_args: 2,
        parse: |a| {
            Ok(Command::UpdateOrder {
                id: number("order", a[0])?,
                status: word(a[1])?,
            })
        },
    },
    Verb {
        name: "orders",
        aliases: &[],
        usage: "orders",
        min_args: 0,
        parse: |_| Ok(Command::Orders),
    },
    Verb {
        name: "bill",
        aliases: &[],
        usage: "bill <guest> <booking-id>",
        min_args: 2,
        parse: |a| {
            Ok(Command::Bill {
                guest_id: a[0].to_string(),
                booking_id: ulid(a[1])?,
            })
        },
    },
    Verb {
        name: "pay",
        aliases: &[],
        usage: "pay <bill> <cash|card>",
        min_args: 2,
        parse: |a| {
            Ok(Command::Pay {
                bill_id: number("bill", a[0])?,
                method: word(a[1])?,
            })
        },
    },
    Verb {
        name: "bills",
        aliases: &[],
        usage: "bills [guest]",
        min_args: 0,
        parse: |a| {
            Ok(Command::Bills {
                guest_id: a.first().map(|s| s.to_string()),
            })
        },
    },
    Verb {
        name: "report",
        aliases: &[],
        usage: "report",
        min_args: 0,
        parse: |_| Ok(Command::Report),
    },
    Verb {
        name: "quit",
        aliases: &["exit"],
        usage: "quit",
        min_args: 0,
        parse: |_| Ok(Command::Quit),
    },
];

/// Usage lines for every verb.
pub fn help() -> String {
    let mut out = String::from("commands:");
    for verb in VERBS {
        let _ = write!(out, "\n  {}", verb.usage);
    }
    out.push_str("\ndates are YYYY-MM-DD or DD/MM/YYYY");
    out
}

/// Parse a whitespace-separated command line through the verb table.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let name = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let verb = VERBS
        .iter()
        .find(|v| v.name == name || v.aliases.contains(&name.as_str()))
        .ok_or(CommandError::UnknownCommand(name))?;
    if args.len() < verb.min_args {
        return Err(CommandError::WrongArity(verb.name, verb.min_args, args.len()));
    }
    (verb.parse)(&args)
}

fn number<T: FromStr>(what: &str, s: &str) -> Result<T, CommandError> {
    s.parse()
        .map_err(|_| CommandError::Parse(format!("{what}: expected a number, got {s}")))
}

fn word<T: FromStr<Err = String>>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(CommandError::Parse)
}

fn date(s: &str) -> Result<Date, CommandError> {
    Ok(calendar::parse(s)?)
}

fn ulid(s: &str) -> Result<Ulid, CommandError> {
    Ulid::from_string(s).map_err(|e| CommandError::Parse(format!("bad booking id {s}: {e}")))
}

/// Parse and run one line.
pub async fn dispatch(engine: &Engine, line: &str) -> Result<String, CommandError> {
    let cmd = parse_command(line)?;
    run(engine, cmd).await
}

/// Run a parsed command, recording command and rejection metrics.
pub async fn run(engine: &Engine, cmd: Command) -> Result<String, CommandError> {
    let name = cmd.name();
    let start = Instant::now();
    let result = execute(engine, cmd).await;

    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::counter!(COMMANDS_TOTAL, "command" => name, "status" => status).increment(1);
    metrics::histogram!(COMMAND_DURATION_SECONDS, "command" => name)
        .record(start.elapsed().as_secs_f64());
    if let Err(CommandError::Engine(e)) = &result {
        metrics::counter!(REJECTIONS_TOTAL, "kind" => error_label(e)).increment(1);
        debug!(command = name, "rejected: {e}");
    }
    result
}

async fn execute(engine: &Engine, cmd: Command) -> Result<String, CommandError> {
    match cmd {
        Command::Help => Ok(help()),
        Command::Quit => Ok("bye".to_string()),
        Command::Register(new) => render(&engine.register_guest(new).await?),
        Command::Guest { guest_id } => render(&engine.guest_profile(&guest_id).await?),
        Command::Rooms {
            available_only,
            room_type,
        } => {
            let rooms = if available_only {
                engine.available_rooms(room_type).await
            } else {
                engine.list_rooms().await
            };
            Ok(room_table(&rooms))
        }
        Command::BookRoom {
            guest_id,
            room_no,
            check_in,
            check_out,
        } => render(&engine.book_room(&guest_id, room_no, check_in, check_out).await?),
        Command::ReleaseRoom { room_no } => {
            engine.release_room(room_no).await?;
            Ok(format!("room {room_no} released"))
        }
        Command::Facilities => render(&engine.list_facilities().await),
        Command::BookFacility {
            guest_id,
            facility_id,
            day,
        } => render(&engine.book_facility(&guest_id, facility_id, day).await?),
        Command::ReleaseFacility { facility_id } => {
            engine.release_facility(facility_id).await?;
            Ok(format!("facility {facility_id} released"))
        }
        Command::Park { guest_id, vehicle } => {
            match engine.allocate_parking(&guest_id, &vehicle).await? {
                ParkingOutcome::Assigned { slot } => Ok(format!("slot {slot} assigned to {guest_id}")),
                ParkingOutcome::Waitlisted { position } => {
                    Ok(format!("parking full; {guest_id} waitlisted at position {position}"))
                }
            }
        }
        Command::Unpark { guest_id } => {
            let slot = engine.release_parking(&guest_id).await?;
            Ok(format!("slot {slot} released"))
        }
        Command::Waitlist => render(&engine.waitlist().await),
        Command::DrainWaitlist => render(&engine.drain_waitlist().await),
        Command::Booking { id } => render(&engine.find_booking(id).await?),
        Command::Bookings { guest_id } => match guest_id {
            Some(g) => render(&engine.list_by_guest(&g).await),
            None => render(&engine.list_bookings().await),
        },
        Command::Advance { today } => {
            let today = today.unwrap_or_else(calendar::today);
            render(&engine.advance_statuses(today).await?)
        }
        Command::ReportIssue {
            room_no,
            kind,
            priority,
            description,
        } => render(
            &engine
                .report_maintenance(room_no, kind, &description, priority)
                .await?,
        ),
        Command::UpdateIssue { id, status } => render(&engine.update_maintenance(id, status).await?),
        Command::Issues => render(&engine.maintenance_requests().await),
        Command::Menu => {
            let mut out = String::new();
            for (i, (item, price)) in SERVICE_MENU.iter().enumerate() {
                let _ = writeln!(out, "{}. {item} - {price}", i + 1);
            }
            Ok(out.trim_end().to_string())
        }
        Command::Order { room_no, choice } => render(&engine.order_service(room_no, choice).await?),
        Command::UpdateOrder { id, status } => render(&engine.update_service(id, status).await?),
        Command::Orders => render(&engine.service_orders().await),
        Command::Bill {
            guest_id,
            booking_id,
        } => render(&engine.generate_bill(&guest_id, booking_id).await?),
        Command::Pay { bill_id, method } => render(&engine.pay_bill(bill_id, method).await?),
        Command::Bills { guest_id } => render(&engine.list_bills(guest_id.as_deref()).await),
        Command::Report => render(&engine.occupancy_report().await),
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, CommandError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn room_table(rooms: &[Room]) -> String {
    let mut out = String::from("room  type      floor  cap  nightly   status");
    for r in rooms {
        let _ = write!(
            out,
            "\n{:<5} {:<9} {:<6} {:<4} {:<9} {}",
            r.number,
            r.room_type.to_string(),
            r.floor,
            r.capacity,
            r.nightly_price.to_string(),
            r.status
        );
    }
    out
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),
    #[error("{0}: expected at least {1} arguments, got {2}")]
    WrongArity(&'static str, usize, usize),
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("render error: {0}")]
    Render(#[from] serde_json::Error),
}
