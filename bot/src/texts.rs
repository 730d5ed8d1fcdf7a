//! Every user-visible string in one place. The game speaks Russian with
//! the occasional CS:GO English; handlers never format text themselves.

use chrono::Duration;
use clutch_engine::{CaseError, PromoError, Team};
use clutch_types::{GameConfig, RankMetric, RankStanding};
use rand::Rng;

pub const BTN_PLAY: &str = "🎮 Сыграть матч";
pub const BTN_STATS: &str = "📊 Моя статистика";
pub const BTN_TOP: &str = "🏆 Топ игроков";
pub const BTN_CASES: &str = "🎁 Открыть кейс";
pub const BTN_HELP: &str = "❓ Помощь";
pub const BTN_TEAM_T: &str = "💣 Террористы";
pub const BTN_TEAM_CT: &str = "🛡️ Спецназ";
pub const BTN_BACK: &str = "🔙 Назад";
pub const BTN_OPEN_CASE: &str = "🔓 Открыть кейс";

pub const START_BANNER: &str = "🎮 <b>CS:GO Match Bot</b>";
pub const PRIVATE_REDIRECT: &str = "🤖 Этот бот работает только в группах!\n\n\
     Добавьте меня в группу, чтобы играть в CS:GO матчи.\n\n\
     По всем предложениям/рекламе: @George321123";
pub const PROMO_PRIVATE: &str = "ℹ️ Промокоды активируются только в группах!";
pub const PROMO_USAGE: &str = "❌ Укажите промокод: /promo КОД";
pub const CHOOSE_TEAM: &str = "Выберите команду:";
pub const MAIN_MENU: &str = "Главное меню:";
pub const NO_GAMES_SELF: &str = "Вы еще не играли в этом чате!";
pub const NO_GAMES_CHAT: &str = "В этом чате еще никто не играл!";
pub const CASES_HEADER: &str = "🎁 <b>Выберите кейс для открытия:</b>";
pub const CAN_PLAY_NOW: &str = "✅ Можно играть сейчас";
pub const COOLDOWN_UNKNOWN: &str = "⏳ Время кулдауна неизвестно";

const WIN_PHRASES_T: [&str; 7] = [
    "Bomb has been planted! 💣",
    "T wins! Rush B успешен! 🏃",
    "Изи пизи лимон сквизи! 🍋",
    "Терры победили! GG EZ!",
    "ГГ в чатик! Хорошая игра! ✌️",
    "Командная работа: я командовал — вы работали!",
    "Изи фо Энс, Энс, Энс Дэнс пУтэт аппербелт ПУтэт аппербелт",
];

const WIN_PHRASES_CT: [&str; 6] = [
    "Bomb defused! 🛡️",
    "CT win! Mission accomplished! ✅",
    "Спецназ рулит! Терры что с лицом ?👮",
    "GG, теры в шоке от этой прикормки",
    "флэш, флэш бадэнг, флэш бадэнг э дэнс Флэш, флэш бадэнг, бэнг э дэнг э дэнс",
    "Позвоните в МЧС — я только что сжёг пятерых!",
];

const LOSE_PHRASES: [&str; 8] = [
    "Ты проиграл... лаги, конечно! 🌐",
    "слышны только удары по столу",
    "ОКАК",
    "НУ как так? Была одна победа до повышения🔌",
    "Это стратегическое отступление! 🏃",
    "я такой лоутаб",
    "Братва, зато по фану!",
    "GG, я иду плакать.",
];

const DRAW_PHRASES: [&str; 6] = [
    "Ничья! Кто-то доволен?",
    "30-30 - классика! 🎭",
    "Ну почти... почти... 🤏",
    "Оба молодцы  🤝",
    "Технически — мы не проиграли!",
    "Фигня, давай по новой.",
];

const TOP_TEAMS: [&str; 4] = ["NAVI", "Virtus pro", "Gambit", "Faze"];

pub fn win_phrase<R: Rng>(team: Team, rng: &mut R) -> &'static str {
    let options: &[&str] = match team {
        Team::Terrorists => &WIN_PHRASES_T,
        Team::CounterTerrorists => &WIN_PHRASES_CT,
    };
    options[rng.gen_range(0..options.len())]
}

pub fn lose_phrase<R: Rng>(rng: &mut R) -> &'static str {
    LOSE_PHRASES[rng.gen_range(0..LOSE_PHRASES.len())]
}

pub fn draw_phrase<R: Rng>(rng: &mut R) -> &'static str {
    DRAW_PHRASES[rng.gen_range(0..DRAW_PHRASES.len())]
}

/// Pro-team tag decorating the leaderboard header.
pub fn top_team_tag<R: Rng>(rng: &mut R) -> &'static str {
    TOP_TEAMS[rng.gen_range(0..TOP_TEAMS.len())]
}

/// `7ч 42м` style remainder. Callers only pass positive durations.
pub fn format_remaining(remaining: Duration) -> String {
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    format!("{hours}ч {minutes}м")
}

pub fn cooldown_notice(remaining: Duration) -> String {
    format!(
        "⏳ До следующей игры осталось: {}",
        format_remaining(remaining)
    )
}

pub fn stats_cooldown(remaining: Duration) -> String {
    format!("⏳ До следующей игры: {}", format_remaining(remaining))
}

/// Unit word for "progress to next rank" lines, matching the metric the
/// ladder is resolved against.
pub fn metric_unit(metric: RankMetric) -> &'static str {
    match metric {
        RankMetric::Wins => "побед",
        RankMetric::Points => "очков",
    }
}

pub fn win_report(phrase: &str, gained: u64, rank: &str) -> String {
    format!("{phrase}\nПобеда! +{gained} очков 🏆\nНовый ранг: {rank}")
}

pub fn loss_report(phrase: &str, lost: u64) -> String {
    format!("{phrase}\nПоражение... -{lost} очков 💀")
}

pub fn draw_report(phrase: &str) -> String {
    format!("{phrase}\nНичья! Очки не изменились ➖")
}

pub fn match_report(
    outcome: &str,
    standing: &RankStanding<'_>,
    points: u64,
    wins: u64,
    unit: &str,
) -> String {
    format!(
        "{outcome}\n\n\
         🏅 Текущий ранг: {}\n\
         ⭐ Очки: {points}\n\
         📈 До следующего ранга: {} {unit}\n\
         🎯 Побед: {wins}",
        standing.rank, standing.to_next
    )
}

pub fn stats_text(
    standing: &RankStanding<'_>,
    points: u64,
    wins: u64,
    unit: &str,
    cooldown_line: &str,
) -> String {
    format!(
        "📊 <b>Ваша статистика:</b>\n\n\
         🏅 Текущий ранг: {}\n\
         ⭐ Очки: {points}\n\
         📈 До следующего ранга: {} {unit}\n\
         🎯 Побед: {wins}\n\
         {cooldown_line}",
        standing.rank, standing.to_next
    )
}

pub fn promo_success(points: u64, remaining: u64) -> String {
    format!(
        "🎉 Промокод активирован!\n\
         +{points} очков\n\
         Осталось активаций: {remaining}\n\
         ⚠️ Вы больше не сможете использовать этот промокод!"
    )
}

pub fn promo_reply(error: &PromoError) -> &'static str {
    match error {
        PromoError::InvalidCode => "❌ Неверный промокод",
        PromoError::AlreadyUsed => "⚠️ Вы уже использовали этот промокод!",
        PromoError::LimitReached { .. } => "⚠️ Лимит активаций исчерпан",
    }
}

/// Toast shown on a rejected case press.
pub fn case_toast(error: &CaseError) -> String {
    match error {
        CaseError::UnknownCase => "❌ Такого кейса не существует".to_string(),
        CaseError::NoHistory => "❌ Вы еще не играли в этом чате!".to_string(),
        CaseError::InsufficientPoints { needed, .. } => {
            format!("❌ Недостаточно очков! Нужно {needed}")
        }
        CaseError::EmptyPool => "❌ Ошибка: нет доступных скинов в кейсе".to_string(),
    }
}

pub fn case_button_label(name: &str, price: u64) -> String {
    format!("{name} - {price} очков")
}

pub fn case_preview_caption(name: &str, price: u64) -> String {
    format!(
        "🎁 Вы выбрали: {name}\n\
         💳 Стоимость: {price} очков\n\n\
         Нажмите кнопку ниже, чтобы открыть кейс!"
    )
}

pub fn drop_caption(
    skin_name: &str,
    rarity: &str,
    skin_price: u64,
    case_price: u64,
    balance: u64,
) -> String {
    format!(
        "🎉 Поздравляем! Вы получили:\n\n\
         🔫 <b>{skin_name}</b>\n\
         🏷 Редкость: {rarity}\n\
         💵 Стоимость: {skin_price} очков\n\n\
         💳 Потрачено: {case_price} очков\n\
         💰 Баланс: {balance} очков"
    )
}

pub fn top_header(team: &str) -> String {
    format!("🏆 {team} | <b>Топ игроков:</b>\n\n")
}

pub fn top_row(position: usize, name: &str, points: u64, wins: u64, rank: &str) -> String {
    format!("{position}. {name} - {points} очков | {wins} побед (ранг: {rank})\n")
}

/// Placeholder when neither the live lookup nor the cache knows a name.
pub fn fallback_player_name(user_id: &str) -> String {
    let skip = user_id.chars().count().saturating_sub(4);
    let tail: String = user_id.chars().skip(skip).collect();
    format!("Игрок {tail}")
}

fn command_guide(config: &GameConfig) -> String {
    format!(
        "<b>Основные команды:</b>\n\
         • /t или кнопка 💣 Террористы - играть за террористов\n\
         • /ct или кнопка 🛡️ Спецназ - играть за спецназ\n\
         • /stats или кнопка 📊 Моя статистика - ваша статистика\n\
         • /promo и промокод- ввод промокода\n\
         • /top или кнопка 🏆 Топ игроков - топ игроков чата\n\
         • /open или кнопка 🎁 Открыть кейс - открыть кейс со скинами\n\n\
         <b>Как играть:</b>\n\
         1. Выберите команду (Террористы/Спецназ)\n\
         2. Бот определит результат матча\n\
         3. Получайте очки и повышайте ранг\n\
         4. Играть можно 1 раз в {} часов в каждом чате\n\n\
         <b>Система рангов:</b>\n\
         • Ранги от Silver 1 до Challenger💎\n\
         • За победы получаете очки ({}-{} за победу)\n\
         • За поражения теряете очки ({}-{} за поражение)\n\
         • Ничья не изменяет количество очков\n\n\
         <b>Система кейсов:</b>\n\
         • Можно открывать кейсы за очки\n\
         • Чем дороже кейс - тем лучше скины\n\
         • Редкие скины выпадают редко",
        config.cooldown_hours,
        config.win_points_min,
        config.win_points_max,
        config.loss_points_min,
        config.loss_points_max,
    )
}

pub fn help_text(config: &GameConfig) -> String {
    format!(
        "🎮 <b>CS:GO Match Bot - Помощь</b>\n\
         <b>👉 Поддержи проект донатом-https://boosty.to/rankgrinder_bot</b>\n\n\
         {}",
        command_guide(config)
    )
}

/// Greeting sent when the bot joins a chat: the help text without the
/// donation plug.
pub fn welcome_text(config: &GameConfig) -> String {
    format!("🎮 <b>CS:GO Match Bot</b>\n\n{}", command_guide(config))
}
