use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use helpdesk_client::views::{
    LoginForm, RegisterForm, ReportView, TicketBoard, TicketFilter, TicketHistoryView,
    TicketSummary, UserDirectory,
};
use helpdesk_client::{
    FileSessionStore, GuardDecision, HistoryNavigator, HttpHelpdeskClient, LoginOutcome,
    Navigator, Route, RouteGuard, SessionContext, SessionStore, navigation_for,
};
use helpdesk_sdk::{
    HelpdeskClient, HelpdeskError, Identity, IdentityPatch, NewTicket, Role, TicketId,
    TicketPriority, TicketStatus, UserId,
};

use crate::config::AppConfig;
use crate::render;

/// Exit code when a guard sent the user to another page.
const EXIT_REDIRECTED: u8 = 2;
/// Exit code when the role may not open the page or run the action.
const EXIT_FORBIDDEN: u8 = 3;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with an email address
    Login { email: String },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// cliente, operador or admin
        #[arg(long, default_value = "cliente")]
        role: Role,
    },
    /// Dashboard: navigation and ticket counters
    Home,
    /// List your tickets
    Tickets {
        #[arg(long)]
        status: Option<TicketStatus>,
        #[arg(long)]
        priority: Option<TicketPriority>,
    },
    /// Work on a single ticket
    Ticket {
        #[command(subcommand)]
        action: TicketAction,
    },
    /// Ticket statistics (staff only)
    Reports,
    /// List or edit users (staff only)
    Users {
        #[command(subcommand)]
        action: Option<UserAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum TicketAction {
    /// Open a ticket on behalf of a customer (staff only)
    Create {
        #[arg(long)]
        client_email: String,
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "media")]
        priority: TicketPriority,
    },
    /// Change the status of a ticket (staff only)
    Status { id: TicketId, status: TicketStatus },
    /// Change the priority of a ticket (staff only)
    Priority {
        id: TicketId,
        priority: TicketPriority,
    },
    /// Show the conversation of a ticket
    History { id: TicketId },
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// Update fields of a user
    Update {
        id: UserId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        active: Option<bool>,
    },
}

impl Command {
    /// Page the command runs on.
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Command::Login { .. } => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Logout | Command::Whoami | Command::Home => Route::Home,
            Command::Tickets { .. } | Command::Ticket { .. } => Route::Tickets,
            Command::Reports => Route::Reports,
            Command::Users { .. } => Route::Users,
        }
    }
}

fn failure(err: &HelpdeskError) -> ExitCode {
    match err {
        HelpdeskError::Forbidden { .. } => ExitCode::from(EXIT_FORBIDDEN),
        _ => ExitCode::FAILURE,
    }
}

/// One command invocation: client, token store, history and session.
pub struct App {
    client: Arc<dyn HelpdeskClient>,
    navigator: Arc<HistoryNavigator>,
    session: SessionContext,
}

impl App {
    /// Build the stack and resolve the stored session.
    ///
    /// # Errors
    /// Invalid API settings or no usable session path.
    pub async fn start(config: &AppConfig, route: Route) -> Result<Self> {
        let client: Arc<dyn HelpdeskClient> = Arc::new(HttpHelpdeskClient::new(&config.api)?);
        let store = Arc::new(FileSessionStore::new(config.session_path()?));
        Ok(Self::assemble(client, store, route).await)
    }

    async fn assemble(
        client: Arc<dyn HelpdeskClient>,
        store: Arc<dyn SessionStore>,
        route: Route,
    ) -> Self {
        let navigator = Arc::new(HistoryNavigator::new(route));

        let session = SessionContext::new(
            Arc::clone(&client),
            store,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );
        session.init().await;
        tracing::debug!(
            signed_in = session.current_identity().is_some(),
            "session resolved"
        );

        Self {
            client,
            navigator,
            session,
        }
    }

    /// Run the page guard. `Err` carries the exit code when the page must
    /// not render.
    fn open(&self, route: Route) -> Result<Option<Identity>, ExitCode> {
        let mut guard = RouteGuard::new(route);
        match guard.check(&self.session.snapshot(), &*self.navigator) {
            GuardDecision::Render(identity) => Ok(identity),
            GuardDecision::Redirected(target) => {
                println!(
                    "{} {} ({})",
                    "\u{2192}".dimmed(),
                    target.label(),
                    target.path()
                );
                match target {
                    Route::Login => {
                        render::notice("Inicia sesi\u{f3}n con: ticketdesk login <email>");
                    }
                    Route::Home => render::notice("Ya has iniciado sesi\u{f3}n"),
                    _ => {}
                }
                Err(ExitCode::from(EXIT_REDIRECTED))
            }
            GuardDecision::Denied => {
                render::inline_error("No tienes permisos para ver esta p\u{e1}gina");
                Err(ExitCode::from(EXIT_FORBIDDEN))
            }
            GuardDecision::Placeholder => {
                render::inline_error("La sesi\u{f3}n no se pudo resolver");
                Err(ExitCode::FAILURE)
            }
        }
    }

    fn signed_in(&self, route: Route) -> Result<Identity, ExitCode> {
        self.open(route)?.ok_or(ExitCode::FAILURE)
    }

    async fn board(&self) -> TicketBoard {
        let mut board = TicketBoard::new(Arc::clone(&self.client));
        board.sync(&self.session.snapshot()).await;
        board
    }

    pub async fn run(&self, command: Command) -> ExitCode {
        let route = command.route();
        match command {
            Command::Login { email } => self.login(email).await,
            Command::Logout => self.logout(),
            Command::Whoami => self.whoami(route),
            Command::Register { name, email, role } => self.register(name, email, role).await,
            Command::Home => self.home(route).await,
            Command::Tickets { status, priority } => {
                self.tickets(route, TicketFilter { status, priority }).await
            }
            Command::Ticket { action } => self.ticket(route, action).await,
            Command::Reports => self.reports(route).await,
            Command::Users { action } => self.users(route, action).await,
        }
    }

    async fn login(&self, email: String) -> ExitCode {
        if let Err(code) = self.open(Route::Login) {
            return code;
        }
        let mut form = LoginForm::new(email);
        match form.submit(&self.session).await {
            Some(LoginOutcome::LoggedIn(me)) => {
                println!("{}", "Sesi\u{f3}n iniciada".green());
                render::identity(&me);
                render::navigation(&navigation_for(Some(me.role)));
                ExitCode::SUCCESS
            }
            Some(LoginOutcome::Ignored | LoginOutcome::Superseded) => {
                render::notice("El inicio de sesi\u{f3}n no se complet\u{f3}");
                ExitCode::FAILURE
            }
            None => {
                render::inline_error(form.error().unwrap_or_default());
                ExitCode::FAILURE
            }
        }
    }

    fn logout(&self) -> ExitCode {
        self.session.logout();
        println!("{}", "Sesi\u{f3}n cerrada".green());
        ExitCode::SUCCESS
    }

    fn whoami(&self, route: Route) -> ExitCode {
        match self.signed_in(route) {
            Ok(me) => {
                render::identity(&me);
                ExitCode::SUCCESS
            }
            Err(code) => code,
        }
    }

    async fn register(&self, name: String, email: String, role: Role) -> ExitCode {
        if let Err(code) = self.open(Route::Register) {
            return code;
        }
        let mut form = RegisterForm::default();
        form.name = name;
        form.email = email;
        form.role = role;
        match form.submit(&*self.client, &*self.navigator).await {
            Ok(created) => {
                println!("{}", form.notice().unwrap_or_default().green());
                render::identity(&created);
                ExitCode::SUCCESS
            }
            Err(e) => {
                render::inline_error(form.error().unwrap_or_default());
                failure(&e)
            }
        }
    }

    async fn home(&self, route: Route) -> ExitCode {
        let me = match self.signed_in(route) {
            Ok(me) => me,
            Err(code) => return code,
        };
        println!("Bienvenido, {}", me.display_name.bold());
        render::navigation(&navigation_for(Some(me.role)));
        println!();
        let board = self.board().await;
        render::summary(&TicketSummary::from_tickets(board.tickets()));
        ExitCode::SUCCESS
    }

    async fn tickets(&self, route: Route, filter: TicketFilter) -> ExitCode {
        if let Err(code) = self.signed_in(route) {
            return code;
        }
        let mut board = self.board().await;
        board.set_filter(filter);
        match board.empty_state() {
            Some(text) => println!("{}", text.dimmed()),
            None => render::tickets(&board.visible()),
        }
        ExitCode::SUCCESS
    }

    async fn ticket(&self, route: Route, action: TicketAction) -> ExitCode {
        if let Err(code) = self.signed_in(route) {
            return code;
        }

        if let TicketAction::History { id } = &action {
            render::history(&TicketHistoryView::load(&*self.client, id).await);
            return ExitCode::SUCCESS;
        }

        let mut board = self.board().await;
        let result = match action {
            TicketAction::Create {
                client_email,
                subject,
                description,
                priority,
            } => board
                .create_ticket(NewTicket {
                    client_email,
                    subject,
                    description,
                    priority,
                })
                .await
                .map(|created| {
                    println!("{} #{}", "Ticket creado".green(), created.id);
                    board.tickets().iter().find(|t| t.id == created.id).cloned()
                }),
            TicketAction::Status { id, status } => board
                .change_status(&id, status)
                .await
                .map(|()| board.tickets().iter().find(|t| t.id == id).cloned()),
            TicketAction::Priority { id, priority } => board
                .change_priority(&id, priority)
                .await
                .map(|()| board.tickets().iter().find(|t| t.id == id).cloned()),
            TicketAction::History { .. } => Ok(None),
        };

        match result {
            Ok(ticket) => {
                if let Some(ticket) = ticket {
                    render::ticket_detail(&ticket);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                render::inline_error(board.error().unwrap_or_default());
                failure(&e)
            }
        }
    }

    async fn reports(&self, route: Route) -> ExitCode {
        let me = match self.signed_in(route) {
            Ok(me) => me,
            Err(code) => return code,
        };
        match ReportView::load(&*self.client, &me).await {
            Ok(report) => {
                render::report(&report);
                ExitCode::SUCCESS
            }
            Err(e) => {
                render::inline_error(&e.user_message("No se pudo cargar el reporte"));
                failure(&e)
            }
        }
    }

    async fn users(&self, route: Route, action: Option<UserAction>) -> ExitCode {
        let me = match self.signed_in(route) {
            Ok(me) => me,
            Err(code) => return code,
        };
        let mut directory = match UserDirectory::load(&*self.client, &me).await {
            Ok(directory) => directory,
            Err(e) => {
                render::inline_error(&e.user_message("No se pudieron cargar los usuarios"));
                return failure(&e);
            }
        };

        let Some(UserAction::Update {
            id,
            name,
            email,
            role,
            active,
        }) = action
        else {
            render::users(&directory);
            return ExitCode::SUCCESS;
        };

        let patch = IdentityPatch {
            display_name: name,
            email,
            role,
            active,
        };
        match directory
            .update_user(&*self.client, &me, id, &patch)
            .await
        {
            Ok(updated) => {
                println!("{}", "Usuario actualizado".green());
                render::identity(&updated);
                ExitCode::SUCCESS
            }
            Err(e) => {
                render::inline_error(directory.error().unwrap_or_default());
                failure(&e)
            }
        }
    }
}
