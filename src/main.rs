use billpilot_lib::{run, Command};

fn main() {
    if let Err(e) = run(Command::from_args(std::env::args())) {
        log::error!("アプリケーションの実行に失敗しました: {}", e.details());
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
