//! Line-oriented front end over `AppServices`.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};

use quiz_core::model::{Palette, Theme};
use services::error::LedgerError;
use services::{AppServices, QuizSession, RestartTarget, SessionResult, SessionSource, SessionStatus};

enum Screen {
    Home,
    Listing,
    Playing(QuizSession),
    Finished(SessionResult),
    History,
    Profile,
    Quit,
}

pub struct Terminal<R, W> {
    app: AppServices,
    input: R,
    output: W,
    /// Shown once, on the first home screen.
    startup_notice: Option<String>,
}

impl Terminal<BufReader<Stdin>, Stdout> {
    pub fn stdio(app: AppServices) -> Self {
        Self::new(app, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(app: AppServices, input: R, output: W) -> Self {
        let startup_notice = app.history_notice().map(history_notice_text);
        Self {
            app,
            input,
            output,
            startup_notice,
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    /// Drive screens until the user quits or input ends.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut screen = Screen::Home;
        loop {
            screen = match screen {
                Screen::Home => self.home().await?,
                Screen::Listing => self.listing().await?,
                Screen::Playing(session) => self.play(session).await?,
                Screen::Finished(result) => self.finished(result).await?,
                Screen::History => self.history().await?,
                Screen::Profile => self.profile().await?,
                Screen::Quit => break,
            };
        }
        self.output.flush().await
    }

    async fn home(&mut self) -> io::Result<Screen> {
        self.header("Licencia de armas").await?;
        if let Some(notice) = self.startup_notice.take() {
            self.say(&notice).await?;
        }
        self.say("1) Tests por tema").await?;
        self.say("2) Examen (preguntas aleatorias)").await?;
        self.say("3) Historial").await?;
        self.say("4) Perfil").await?;
        self.say("q) Salir").await?;

        let Some(choice) = self.prompt().await? else {
            return Ok(Screen::Quit);
        };
        Ok(match choice.as_str() {
            "1" => Screen::Listing,
            "2" => Screen::Playing(self.app.start_exam()),
            "3" => Screen::History,
            "4" => Screen::Profile,
            "q" => Screen::Quit,
            _ => {
                self.say("Opción no válida.").await?;
                Screen::Home
            }
        })
    }

    async fn listing(&mut self) -> io::Result<Screen> {
        self.header("Tests por tema").await?;
        let sets: Vec<_> = self
            .app
            .bank()
            .iter()
            .map(|(id, set)| (id.clone(), set.title().to_string(), set.len()))
            .collect();
        if sets.is_empty() {
            self.say("No hay tests disponibles.").await?;
        }
        for (i, (_, title, len)) in sets.iter().enumerate() {
            self.say(&format!("{}) {title} ({len} preguntas)", i + 1))
                .await?;
        }
        self.say("v) Volver").await?;

        let Some(choice) = self.prompt().await? else {
            return Ok(Screen::Quit);
        };
        if choice == "v" {
            return Ok(Screen::Home);
        }
        match parse_choice(&choice, sets.len()) {
            Some(index) => {
                let id = sets[index].0.clone();
                Ok(Screen::Playing(self.app.start_session(SessionSource::by_id(id))))
            }
            None => {
                self.say("Opción no válida.").await?;
                Ok(Screen::Listing)
            }
        }
    }

    async fn play(&mut self, mut session: QuizSession) -> io::Result<Screen> {
        self.header(session.title()).await?;
        if session.status() == SessionStatus::Empty {
            self.say("Este test no tiene preguntas.").await?;
            return Ok(Screen::Listing);
        }

        loop {
            let progress = session.progress();
            let Some(question) = session.current_question() else {
                return Ok(Screen::Home);
            };
            let statement = question.statement().to_string();
            let options = question.options().to_vec();
            let image = question.image().map(str::to_string);

            self.say(&format!(
                "Pregunta {} / {}    Aciertos: {}  Errores: {}",
                progress.position + 1,
                progress.total,
                progress.correct,
                progress.wrong
            ))
            .await?;
            self.say(&statement).await?;
            if let Some(image) = image {
                self.say(&format!("[imagen: {image}]")).await?;
            }
            for (i, option) in options.iter().enumerate() {
                self.say(&format!("  {}) {option}", i + 1)).await?;
            }
            self.say("r) Reiniciar  v) Volver").await?;

            let Some(choice) = self.prompt().await? else {
                return Ok(Screen::Quit);
            };
            match choice.as_str() {
                "v" => return Ok(Screen::Listing),
                "r" => {
                    session.restart();
                    continue;
                }
                _ => {}
            }
            let Some(index) = parse_choice(&choice, options.len()) else {
                self.say("Elige una de las opciones.").await?;
                continue;
            };

            let outcome = match session.answer(index) {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.say(&err.to_string()).await?;
                    continue;
                }
            };
            let palette = self.palette();
            if outcome.correct {
                self.say(&paint(palette.success, "Correcto")).await?;
            } else {
                let answer = &options[outcome.correct_choice];
                let line = format!("Incorrecto. Respuesta: {answer}");
                self.say(&paint(palette.danger, &line)).await?;
            }

            if let Some(result) = outcome.result {
                self.record(&result).await?;
                return Ok(Screen::Finished(result));
            }
        }
    }

    async fn record(&mut self, result: &SessionResult) -> io::Result<()> {
        match self.app.ledger().record(result).await {
            Ok(_) => Ok(()),
            Err(LedgerError::Persist(_)) => {
                self.say("Aviso: no se pudo guardar el historial.").await
            }
            Err(err) => {
                log::warn!("result for {:?} not recorded: {err}", result.title);
                Ok(())
            }
        }
    }

    async fn finished(&mut self, result: SessionResult) -> io::Result<Screen> {
        self.header("Resultado").await?;
        self.say(&result.title).await?;
        self.say(&format!(
            "Aciertos: {}  Errores: {}  Total: {}",
            result.correct,
            result.wrong(),
            result.total
        ))
        .await?;
        self.say("v) Volver").await?;
        if !result.is_perfect() {
            self.say("e) Rehacer fallos").await?;
        }
        self.say("r) Reiniciar test").await?;

        let Some(choice) = self.prompt().await? else {
            return Ok(Screen::Quit);
        };
        Ok(match choice.as_str() {
            "v" => Screen::Home,
            "e" => match QuizSession::redo_mistakes(&result) {
                Ok(session) => Screen::Playing(session),
                Err(err) => {
                    self.say(&err.to_string()).await?;
                    Screen::Finished(result)
                }
            },
            "r" => match self.app.restart_original(&result.source) {
                RestartTarget::Session(session) => Screen::Playing(session),
                RestartTarget::Listing => Screen::Listing,
            },
            _ => {
                self.say("Opción no válida.").await?;
                Screen::Finished(result)
            }
        })
    }

    async fn history(&mut self) -> io::Result<Screen> {
        self.header("Historial").await?;
        let entries = self.app.ledger().entries().await;
        if entries.is_empty() {
            self.say("Todavía no hay resultados.").await?;
        }
        for entry in &entries {
            self.say(&format!(
                "{}  {}: {}/{} ({}%)",
                entry.recorded_at().format("%d/%m/%Y %H:%M"),
                entry.title(),
                entry.correct(),
                entry.total(),
                entry.percent()
            ))
            .await?;
        }
        self.say("b) Borrar historial  v) Volver").await?;

        let Some(choice) = self.prompt().await? else {
            return Ok(Screen::Quit);
        };
        Ok(match choice.as_str() {
            "b" => {
                if self.app.ledger().clear().await.is_err() {
                    self.say("Aviso: no se pudo guardar el historial.").await?;
                }
                Screen::History
            }
            "v" => Screen::Home,
            _ => Screen::History,
        })
    }

    async fn profile(&mut self) -> io::Result<Screen> {
        self.header("Perfil").await?;
        let stats = self.app.ledger().aggregate().await;
        self.say(&format!("Tests realizados: {}", stats.count)).await?;
        self.say(&format!("Media: {}%", stats.average_percent)).await?;
        if let Some(best) = &stats.best_topic {
            self.say(&format!("Mejor tema: {} ({}%)", best.title, best.percent))
                .await?;
        }
        if let Some(worst) = &stats.worst_topic {
            self.say(&format!("Peor tema: {} ({}%)", worst.title, worst.percent))
                .await?;
        }
        let theme = self.app.settings().theme();
        self.say(&format!("Tema: {}", theme_label(theme))).await?;
        self.say("t) Cambiar tema").await?;
        self.say("p) Política de privacidad").await?;
        self.say("s) Valorar la app").await?;
        self.say("v) Volver").await?;

        let Some(choice) = self.prompt().await? else {
            return Ok(Screen::Quit);
        };
        match choice.as_str() {
            "t" => {
                self.app.settings().toggle();
            }
            "p" => {
                if self.app.links().open_privacy_policy().is_err() {
                    self.say("No se pudo abrir el enlace.").await?;
                }
            }
            "s" => {
                if self.app.links().open_store_page().is_err() {
                    self.say("No se pudo abrir la tienda.").await?;
                }
            }
            "v" => return Ok(Screen::Home),
            _ => {}
        }
        Ok(Screen::Profile)
    }

    fn palette(&self) -> Palette {
        self.app.settings().palette()
    }

    async fn header(&mut self, title: &str) -> io::Result<()> {
        let palette = self.palette();
        self.say("").await?;
        self.say(&paint(palette.primary, &format!("== {title} =="))).await
    }

    async fn say(&mut self, line: &str) -> io::Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await
    }

    /// Read one trimmed, lowercased line; `None` at end of input.
    async fn prompt(&mut self) -> io::Result<Option<String>> {
        self.output.write_all(b"> ").await?;
        self.output.flush().await?;
        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

fn history_notice_text(err: &LedgerError) -> String {
    match err {
        LedgerError::SkippedEntries { skipped } => {
            format!("Aviso: no se pudieron leer {skipped} resultados del historial.")
        }
        _ => "Aviso: no se pudo leer el historial.".to_string(),
    }
}

/// Parse a 1-based menu choice into a zero-based index below `len`.
fn parse_choice(raw: &str, len: usize) -> Option<usize> {
    let n: usize = raw.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

fn theme_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "claro",
        Theme::Dark => "oscuro",
    }
}

/// Wrap `text` in a 24-bit ANSI foreground colour taken from a `#rgb` or
/// `#rrggbb` hex string. Unparseable colours leave the text as is.
fn paint(hex: &str, text: &str) -> String {
    match hex_rgb(hex) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        3 => {
            let mut it = digits.chars().map(|c| channel(&format!("{c}{c}")));
            Some((it.next()??, it.next()??, it.next()??))
        }
        6 => Some((
            channel(digits.get(0..2)?)?,
            channel(digits.get(2..4)?)?,
            channel(digits.get(4..6)?)?,
        )),
        _ => None,
    }
}
