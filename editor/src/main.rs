use std::{
    io,
    path::PathBuf,
    path::Path,
};

use structopt::{
    clap::{
        AppSettings,
        crate_name,
    },
    StructOpt,
};

use piston_window::{
    Key,
    Input,
    Event,
    Button,
    OpenGL,
    Motion,
    Ellipse,
    ButtonArgs,
    ResizeArgs,
    ButtonState,
    MouseButton,
    PistonWindow,
    WindowSettings,
};

use common::{
    cli,
    client,
    proto,
    problem,
};

mod env;
mod draw;
mod sync;

#[derive(Clone, StructOpt, Debug)]
#[structopt(setting = AppSettings::DeriveDisplayOrder)]
#[structopt(setting = AppSettings::AllowLeadingHyphen)]
pub struct CliArgs {
    #[structopt(flatten)]
    pub common: cli::CommonCliArgs,

    /// assets directory
    #[structopt(long = "assets-directory", default_value = "./assets")]
    pub assets_directory: PathBuf,
    /// window console height in pixels
    #[structopt(long = "console-height", default_value = "32")]
    pub console_height: u32,
    /// window border width in pixels
    #[structopt(long = "border-width", default_value = "16")]
    pub border_width: u32,
    /// window initial screen width in pixels
    #[structopt(long = "screen-width", default_value = "640")]
    pub screen_width: u32,
    /// window initial screen height in pixels
    #[structopt(long = "screen-height", default_value = "480")]
    pub screen_height: u32,
    /// do not load pose
    #[structopt(long = "no-pose-load")]
    pub no_pose_load: bool,
    /// shake method requested from the collaborator
    #[structopt(long = "shake-method", default_value = "random")]
    pub shake_method: String,
    /// shake method parameter
    #[structopt(long = "shake-param", default_value = "3")]
    pub shake_param: i64,
}

#[derive(Debug)]
pub enum Error {
    ProblemFetch(client::ApiError),
    PoseFetch(client::ApiError),
    PoseLoad(problem::FromFileError),
    PoseImport(problem::PoseImportError),
    GlyphsCreate(io::Error),
    EnvCreate(env::CreateError),
    EnvDraw(env::DrawError),
    PistonWindowCreate(Box<dyn std::error::Error>),
    PistonDraw2d(Box<dyn std::error::Error>),
    PoseExport(problem::WriteFileError),
}

fn main() -> Result<(), Error> {
    pretty_env_logger::init();
    let cli_args = CliArgs::from_args();
    log::info!("program starts as: {:?}", cli_args);

    let api = client::Api::new(&cli_args.common.api_url);
    let problem = api.fetch_problem(cli_args.common.problem)
        .map_err(Error::ProblemFetch)?;
    log::debug!(" ;; problem {} loaded: {:?}", cli_args.common.problem, problem);

    let opengl = OpenGL::V3_2;
    let mut window: PistonWindow =
        WindowSettings::new(
            crate_name!(),
            [cli_args.screen_width, cli_args.screen_height],
        )
        .graphics_api(opengl)
        .build()
        .map_err(Error::PistonWindowCreate)?;

    let mut font_path = cli_args.assets_directory;
    font_path.push("FiraSans-Regular.ttf");
    let mut glyphs = window.load_font(&font_path)
        .map_err(Error::GlyphsCreate)?;

    let mut env =
        env::Env::new(
            problem,
            cli_args.screen_width,
            cli_args.screen_height,
            cli_args.console_height,
            cli_args.border_width,
        )
        .map_err(Error::EnvCreate)?;

    if let Some(solution_id) = &cli_args.common.solution_id {
        let pose = api.get_pose(solution_id)
            .map_err(Error::PoseFetch)?;
        env.import_solution(pose)
            .map_err(Error::PoseImport)?;
    } else if !cli_args.no_pose_load && Path::exists(&cli_args.common.pose_file) {
        let pose = problem::Pose::from_file(&cli_args.common.pose_file)
            .map_err(Error::PoseLoad)?;
        env.import_solution(pose)
            .map_err(Error::PoseImport)?;
    }

    let mut server_sync = sync::ServerSync::new(api);

    while let Some(event) = window.next() {
        while let Some(sync_event) = server_sync.poll() {
            match sync_event {
                sync::SyncEvent::Checked { result, .. } =>
                    env.set_check_result(result),
                sync::SyncEvent::Edited { vertices, } =>
                    if let Err(error) = env.apply_external_vertices(vertices) {
                        log::error!("edit response rejected: {:?}", error);
                    },
                sync::SyncEvent::Submitted { confirmation, } =>
                    log::info!("solution submitted: {}", confirmation),
                sync::SyncEvent::Solutions { solutions, } => {
                    log::info!("{} stored solutions for problem {}:", solutions.len(), cli_args.common.problem);
                    for info in solutions {
                        log::info!(" ;; {:?}", info);
                    }
                },
                sync::SyncEvent::Failed { operation, error, } =>
                    log::error!("{} request failed: {:?}", operation, error),
            }
        }

        let maybe_result = window.draw_2d(&event, |context, g2d, device| {
            use piston_window::{clear, text, line, ellipse, Transformed};
            clear([0.0, 0.0, 0.0, 1.0], g2d);

            text::Text::new_color([0.0, 1.0, 0.0, 1.0], 16)
                .draw(
                    &env.console_text(),
                    &mut glyphs,
                    &context.draw_state,
                    context.transform.trans_pos([5.0, 20.0]),
                    g2d,
                )
                .map_err(From::from)
                .map_err(Error::PistonDraw2d)?;

            if let Some(tr) = env.translator() {
                env.draw(
                    &tr,
                    |element| {
                        match element {
                            draw::DrawElement::Line { color, radius, source_x, source_y, target_x, target_y, } =>
                                line(color, radius, [source_x, source_y, target_x, target_y], context.transform, g2d),
                            draw::DrawElement::Ellipse { color, x, y, width, height, filled: true, } =>
                                ellipse(color, [x - (width / 2.0), y - (height / 2.0), width, height], context.transform, g2d),
                            draw::DrawElement::Ellipse { color, x, y, width, height, filled: false, } =>
                                Ellipse::new_border(color, 0.5)
                                    .draw(
                                        [x - (width / 2.0), y - (height / 2.0), width, height],
                                        &context.draw_state,
                                        context.transform,
                                        g2d,
                                    ),
                            draw::DrawElement::Text { color, size, text: caption, x, y, } =>
                                if let Err(error) = text::Text::new_color(color, size).draw(
                                    &caption,
                                    &mut glyphs,
                                    &context.draw_state,
                                    context.transform.trans_pos([x, y]),
                                    g2d,
                                ) {
                                    log::error!("text draw failed: {:?}", error);
                                },
                        }
                    })
                    .map_err(Error::EnvDraw)?;
            }

            // Update glyphs before rendering.
            glyphs.factory.encoder.flush(device);

            Ok(())
        });
        if let Some(result) = maybe_result {
            let () = result?;
        }

        match event {
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Q), state: ButtonState::Release, .. }), _timestamp) =>
                break,
            Event::Input(Input::Resize(ResizeArgs { window_size, .. }), _timestamp) =>
                env.resize(window_size[0] as u32, window_size[1] as u32),
            Event::Input(Input::Move(Motion::MouseCursor(position)), _timestamp) =>
                env.update_mouse_cursor(position),
            Event::Input(Input::Cursor(false), _timestamp) =>
                env.mouse_cursor_left(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Mouse(MouseButton::Left), state: ButtonState::Press, .. }), _timestamp) =>
                env.mouse_down(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Mouse(MouseButton::Left), state: ButtonState::Release, .. }), _timestamp) =>
                env.mouse_up(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::LShift), state, .. }), _timestamp) |
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::RShift), state, .. }), _timestamp) =>
                env.set_shift(state == ButtonState::Press),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::LCtrl), state, .. }), _timestamp) |
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::RCtrl), state, .. }), _timestamp) =>
                env.set_ctrl(state == ButtonState::Press),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Left), state: ButtonState::Press, .. }), _timestamp) =>
                env.nudge_selection(-1, 0),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Right), state: ButtonState::Press, .. }), _timestamp) =>
                env.nudge_selection(1, 0),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Up), state: ButtonState::Press, .. }), _timestamp) =>
                env.nudge_selection(0, -1),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Down), state: ButtonState::Press, .. }), _timestamp) =>
                env.nudge_selection(0, 1),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::A), state: ButtonState::Release, .. }), _timestamp) =>
                env.select_all(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Escape), state: ButtonState::Release, .. }), _timestamp) =>
                env.select_none(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::C), state: ButtonState::Release, .. }), _timestamp) =>
                env.toggle_circles(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Z), state: ButtonState::Release, .. }), _timestamp) =>
                env.undo(),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::M), state: ButtonState::Release, .. }), _timestamp) =>
                server_sync.request_rotate(proto::RotateRequest {
                    problem: env.problem().clone(),
                    vertices: env.pose().vertices.clone(),
                    selected: env.selected().to_vec(),
                    pivot: None,
                    angle: if env.shift_held() { 90 } else { 15 },
                }),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::N), state: ButtonState::Release, .. }), _timestamp) =>
                server_sync.request_rotate(proto::RotateRequest {
                    problem: env.problem().clone(),
                    vertices: env.pose().vertices.clone(),
                    selected: env.selected().to_vec(),
                    pivot: None,
                    angle: if env.shift_held() { -90 } else { -15 },
                }),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Space), state: ButtonState::Release, .. }), _timestamp) =>
                server_sync.request_shake(proto::ShakeRequest {
                    problem: env.problem().clone(),
                    vertices: env.pose().vertices.clone(),
                    selected: env.selected().to_vec(),
                    method: cli_args.shake_method.clone(),
                    param: cli_args.shake_param,
                }),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::Return), state: ButtonState::Release, .. }), _timestamp) => {
                let pose = env.export_solution();
                if let Some(bonus) = pose.bonus() {
                    log::info!("submitting with bonus in play: {:?}", bonus);
                }
                server_sync.request_submit(cli_args.common.problem, pose);
            },
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::L), state: ButtonState::Release, .. }), _timestamp) =>
                server_sync.request_solutions(cli_args.common.problem),
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::E), state: ButtonState::Release, .. }), _timestamp) => {
                let pose = env.export_solution();
                pose.write_to_file(&cli_args.common.pose_file)
                    .map_err(Error::PoseExport)?;
                log::info!("pose {:?} has been written to {:?}", pose, cli_args.common.pose_file);
            },
            Event::Input(Input::Button(ButtonArgs { button: Button::Keyboard(Key::R), state: ButtonState::Release, .. }), _timestamp) =>
                env.figure_reset(),
            _ =>
                (),
        }

        if env.take_pose_changed() {
            server_sync.request_check(env.problem(), env.pose());
        }
    }

    Ok(())
}
