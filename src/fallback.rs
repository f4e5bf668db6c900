//! Offline keyword responder.
//!
//! Used only when no connection is available at send time, so the chat stays
//! useful instead of stalling. A request that was actually attempted and
//! failed gets the fixed apology instead (see `backend::FALLBACK_APOLOGY`).

/// Produce a canned local reply keyed off the user's message.
pub fn offline_reply(message: &str) -> String {
    let lower = message.to_lowercase();

    if lower.contains("pizza") {
        return "For great pizza deals, check out **Tony's Pizza Corner** on Campus North - \
                student specials from $5-8! Local pizza places often run student discounts too."
            .to_string();
    }

    if lower.contains("cheap") || lower.contains("budget") || lower.contains("under") {
        return "Here are some budget-friendly options:\n\
                - **Taco Fiesta** - meals from $2-5\n\
                - **Coffee & Bagels** - breakfast from $2-4\n\
                - **Noodle Express** - filling meals $3-6\n\
                Many places offer student discounts too!"
            .to_string();
    }

    if lower.contains("healthy") {
        return "For healthy options, try:\n\
                - **Salad Station** on Health Campus\n\
                - **Falafel Friends** for vegetarian options\n\
                - **Greek Gyro Spot** for fresh Mediterranean food\n\
                These places focus on fresh, nutritious meals at student-friendly prices!"
            .to_string();
    }

    if lower.contains("late") || lower.contains("night") {
        return "For late-night food, many campus locations stay open late:\n\
                - Pizza places often deliver until midnight\n\
                - Some burger joints have extended hours\n\
                - Check delivery apps for 24/7 options"
            .to_string();
    }

    if lower.contains("delivery") {
        return "Most local restaurants deliver through the popular apps. Student tip: look for \
                delivery promotions and free delivery deals to save money!"
            .to_string();
    }

    if lower.contains("hello") || lower.contains("hi") {
        return "Hi there! I'm here to help you find affordable and delicious food options. \
                What type of food are you craving today?"
            .to_string();
    }

    if lower.contains("help") {
        return "I can help you find:\n\
                - Cheap eats near campus\n\
                - Student meal deals\n\
                - Healthy food options\n\
                - Late-night delivery\n\
                Just tell me what you're looking for!"
            .to_string();
    }

    "I'd love to help you find great food options! While I'm in offline mode right now, I can \
     still give general recommendations. Try asking about specific types of food, budget ranges, \
     or locations you're interested in!"
        .to_string()
}
