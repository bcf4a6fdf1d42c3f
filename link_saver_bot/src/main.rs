use bot_commons::*;

fn main() {
    start_everything("WARN,link_saver_bot=info", link_saver_bot::entry());
}
